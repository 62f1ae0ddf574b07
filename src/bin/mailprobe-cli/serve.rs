use std::sync::Arc;

use anyhow::{Context, Result};
use mailprobe::{ProbeOptions, Verifier, http};

pub fn run(listen: &str, options: ProbeOptions) -> Result<()> {
    // The verifier owns a blocking DNS resolver with its own runtime; it is
    // created before the server runtime and dropped after it.
    let verifier = Arc::new(Verifier::from_system(options).context("init verifier")?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    runtime.block_on(async {
        let listener = http::bind(listen).await?;
        http::serve(listener, http::router(Arc::clone(&verifier)), shutdown_signal()).await?;
        Ok::<_, anyhow::Error>(())
    })?;
    drop(runtime);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
