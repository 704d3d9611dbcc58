//! Symptom check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{correlation_id, run_blocking};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, SymptomRequest, SymptomResponse};

/// `POST /api/v1/symptoms` — free text in, risk, message, explanation and tips out.
pub async fn check(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<SymptomRequest>,
) -> Result<Json<SymptomResponse>, ApiError> {
    let pipeline = Arc::clone(&ctx.pipeline);
    let assessment = run_blocking(move || pipeline.assess(&req.text))
        .await
        .map_err(|e| ApiError::from_pipeline(e, correlation_id(&headers)))?;

    if assessment.drift.drift_detected {
        tracing::warn!(
            drift_score = assessment.drift.drift_score,
            "Request features drifted from reference data"
        );
    }

    Ok(Json(SymptomResponse::from(assessment)))
}
