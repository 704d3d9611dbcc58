use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{correlation_id, run_blocking};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ExplainResponse, FeatureMatrix};

/// `POST /api/v1/explain` — per-feature attributions for each feature row.
pub async fn explain(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<FeatureMatrix>,
) -> Result<Json<ExplainResponse>, ApiError> {
    req.validate_width(ctx.pipeline.n_features())?;

    let pipeline = Arc::clone(&ctx.pipeline);
    let explanations = run_blocking(move || Ok(pipeline.explain_rows(&req.data)))
        .await
        .map_err(|e| ApiError::from_pipeline(e, correlation_id(&headers)))?;

    Ok(Json(ExplainResponse { explanations }))
}
