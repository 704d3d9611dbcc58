//! Shared state and wire types for the HTTP API.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::models::{Assessment, DiseaseRisk};
use crate::pipeline::explain::ExplanationPayload;
use crate::pipeline::SymptomPipeline;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<SymptomPipeline>,
    pub started_at: String,
}

impl ApiContext {
    pub fn new(pipeline: Arc<SymptomPipeline>) -> Self {
        Self {
            pipeline,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// JSON extraction
// ═══════════════════════════════════════════════════════════

/// `Json<T>` whose rejections (malformed JSON, oversized body) become
/// structured `400 BAD_REQUEST` errors.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tip {
    pub tip: String,
}

#[derive(Debug, Serialize)]
pub struct SymptomResponse {
    pub risk: Vec<DiseaseRisk>,
    pub message: String,
    pub shap: ExplanationPayload,
    pub lifestyle: Vec<Tip>,
}

impl From<Assessment> for SymptomResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            risk: assessment.risk,
            message: assessment.message,
            shap: assessment.explanation,
            lifestyle: assessment.tips.into_iter().map(|tip| Tip { tip }).collect(),
        }
    }
}

/// Pre-built feature rows for raw model access.
#[derive(Debug, Deserialize)]
pub struct FeatureMatrix {
    pub data: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Every row must have exactly `width` values.
    pub fn validate_width(&self, width: usize) -> Result<(), ApiError> {
        match self.data.iter().position(|row| row.len() != width) {
            Some(i) => Err(ApiError::BadRequest(format!(
                "row {i} has {} features, model expects {width}",
                self.data[i].len()
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanations: Vec<ExplanationPayload>,
}
