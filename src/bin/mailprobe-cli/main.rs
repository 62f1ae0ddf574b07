use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mailprobe::{MxStatus, check_mx, normalize_email, verify_email};

mod args;
mod output;
#[cfg(feature = "with-http")]
mod serve;

use args::{Cli, Commands};

/// Deliverable, valid, or records found.
const EXIT_POSITIVE: u8 = 0;
const EXIT_FATAL: u8 = 1;
/// Any other classification.
const EXIT_NEGATIVE: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.cmd {
        Commands::Validate {
            mode,
            format,
            email,
        } => {
            let row = normalize_email(&email, mode.into());
            output::normalized(&row, format)?;
            Ok(if row.valid { EXIT_POSITIVE } else { EXIT_NEGATIVE })
        }
        Commands::Mx { format, domain } => {
            let status = check_mx(&domain).with_context(|| format!("MX lookup for {domain}"))?;
            output::mx(&domain, &status, format)?;
            Ok(match status {
                MxStatus::Records(_) => EXIT_POSITIVE,
                MxStatus::NoRecords => EXIT_NEGATIVE,
            })
        }
        Commands::Verify {
            email,
            format,
            probe,
        } => {
            let options = probe.options()?;
            let result = verify_email(&email, options).context("verification")?;
            output::verification(&email, &result, format)?;
            Ok(if result.is_deliverable() {
                EXIT_POSITIVE
            } else {
                EXIT_NEGATIVE
            })
        }
        #[cfg(feature = "with-http")]
        Commands::Serve { listen, probe } => {
            serve::run(&listen, probe.options()?)?;
            Ok(EXIT_POSITIVE)
        }
    }
}
