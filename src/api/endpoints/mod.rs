//! API endpoint handlers.
//!
//! Pipeline work is blocking (recognizer, model, drift log), so handlers hand
//! it to tokio's blocking pool; one slow request never stalls the others.

pub mod consent;
pub mod explain;
pub mod health;
pub mod predict;
pub mod symptoms;

use axum::http::HeaderMap;

use crate::api::middleware::access_log::request_id;
use crate::pipeline::PipelineError;

/// Run `work` on the blocking pool. A panicking worker becomes `PipelineError::Worker`.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))?
}

/// Correlation id for error responses: the request id, or a fresh one.
pub(crate) fn correlation_id(headers: &HeaderMap) -> String {
    request_id(headers)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
