//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub drift_monitor_active: bool,
    pub drift_threshold: f64,
    pub recognizer: &'static str,
    pub explainer_bound: bool,
    pub started_at: String,
}

/// `GET /health` — liveness plus what the pipeline was bound to at startup.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.pipeline.model_label().to_string(),
        drift_monitor_active: ctx.pipeline.drift_monitor_active(),
        drift_threshold: ctx.pipeline.drift_threshold(),
        recognizer: ctx.pipeline.recognizer_name(),
        explainer_bound: ctx.pipeline.explainer_bound(),
        started_at: ctx.started_at.clone(),
    })
}
