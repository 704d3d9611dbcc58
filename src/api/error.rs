//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// Detail is logged with the correlation id and never sent to the client.
    #[error("Internal error [{correlation_id}]: {detail}")]
    Internal {
        detail: String,
        correlation_id: String,
    },
}

impl ApiError {
    /// Convert a pipeline failure for the request identified by `correlation_id`.
    pub fn from_pipeline(err: PipelineError, correlation_id: String) -> Self {
        match err {
            PipelineError::InputTooLong { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal {
                detail: other.to_string(),
                correlation_id,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, correlation_id) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, None),
            ApiError::Internal {
                detail,
                correlation_id,
            } => {
                tracing::error!(detail, correlation_id, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    Some(correlation_id),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                correlation_id,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;
    use axum::body::to_bytes;

    async fn json_of(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("text is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "text is required");
        assert!(json["error"].get("correlation_id").is_none());
    }

    #[tokio::test]
    async fn internal_hides_detail_and_returns_correlation_id() {
        let response = ApiError::Internal {
            detail: "secret stack trace".into(),
            correlation_id: "req-42".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL");
        assert_eq!(json["error"]["correlation_id"], "req-42");
        assert!(!json.to_string().contains("secret"));
    }

    #[test]
    fn overlong_input_maps_to_bad_request() {
        let err = ApiError::from_pipeline(
            PipelineError::InputTooLong {
                actual: 6000,
                max: 5000,
            },
            "id".into(),
        );
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn broken_invariant_maps_to_internal() {
        let err = ApiError::from_pipeline(
            PipelineError::Inconsistent {
                stage: Stage::Scored,
                detail: "mismatch".into(),
            },
            "id".into(),
        );
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}
