use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{correlation_id, run_blocking};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, FeatureMatrix, PredictResponse};

/// `POST /api/v1/predict` — raw class probabilities `[p0, p1]` per feature row.
pub async fn predict(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<FeatureMatrix>,
) -> Result<Json<PredictResponse>, ApiError> {
    req.validate_width(ctx.pipeline.n_features())?;

    let pipeline = Arc::clone(&ctx.pipeline);
    let predictions = run_blocking(move || Ok(pipeline.predict_rows(&req.data)))
        .await
        .map_err(|e| ApiError::from_pipeline(e, correlation_id(&headers)))?;

    Ok(Json(PredictResponse { predictions }))
}
