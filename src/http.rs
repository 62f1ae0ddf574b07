//! JSON-over-HTTP front end: `POST /verify`.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::mx::LookupMx;
use crate::probe::Prober;
use crate::verify::{VerificationResult, Verifier};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server failed: {0}")]
    Server(#[source] std::io::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful answer: the submitted address next to the verification fields.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub email: String,
    #[serde(flatten)]
    pub result: VerificationResult,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_response(status: StatusCode, error: &'static str, details: Option<String>) -> Response {
    (status, Json(ErrorBody { error, details })).into_response()
}

pub fn router<R, P>(verifier: Arc<Verifier<R, P>>) -> Router
where
    R: LookupMx + Send + Sync + 'static,
    P: Prober + Send + Sync + 'static,
{
    Router::new()
        .route("/verify", post(verify_handler::<R, P>))
        .with_state(verifier)
}

pub async fn bind(address: &str) -> Result<TcpListener, ServeError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServeError::Bind {
            address: address.to_string(),
            source,
        })?;
    tracing::info!(%address, "verification server bound");
    Ok(listener)
}

/// Serves `router` until `shutdown` completes. In-flight requests are
/// allowed to finish.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServeError::Server)?;
    tracing::info!("verification server stopped");
    Ok(())
}

async fn verify_handler<R, P>(
    State(verifier): State<Arc<Verifier<R, P>>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response
where
    R: LookupMx + Send + Sync + 'static,
    P: Prober + Send + Sync + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid JSON body",
                Some(rejection.body_text()),
            );
        }
    };
    let Some(email) = request.email.filter(|email| !email.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing email field", None);
    };

    let job_email = email.clone();
    // probes block on sockets for up to one timeout per exchanger
    let joined = tokio::task::spawn_blocking(move || verifier.verify(&job_email)).await;

    match joined {
        Ok(Ok(result)) => (StatusCode::OK, Json(VerifyResponse { email, result })).into_response(),
        Ok(Err(err)) => {
            tracing::error!(%email, error = %err, "verification failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(err.to_string()),
            )
        }
        Err(err) => {
            tracing::error!(%email, error = %err, "verification worker died");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(err.to_string()),
            )
        }
    }
}
