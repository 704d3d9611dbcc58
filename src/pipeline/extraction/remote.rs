use std::time::Duration;

use serde::Serialize;

use crate::pipeline::error::{ConfigError, ExternalCallError};
use crate::pipeline::traits::{EntityRecognizer, RecognizedEntity};

const SERVICE: &str = "ner";

/// HTTP client for a remote token-classification model.
///
/// Posts `{"inputs": "<text>"}` and expects a JSON array of
/// `{"entity_group", "word", "score"}` objects (aggregated NER output).
pub struct HttpEntityRecognizer {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    inputs: &'a str,
}

impl HttpEntityRecognizer {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EntityRecognizer for HttpEntityRecognizer {
    fn name(&self) -> &'static str {
        "http"
    }

    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, ExternalCallError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest { inputs: text })
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ExternalCallError::Computation(format!(
                        "NER request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ExternalCallError::Unreachable {
                        service: SERVICE,
                        endpoint: self.endpoint.clone(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExternalCallError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<RecognizedEntity>>()
            .map_err(|e| ExternalCallError::Decode {
                service: SERVICE,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;

    use super::*;

    /// Serve a stub NER backend on an ephemeral port.
    async fn stub_server() -> SocketAddr {
        let app = Router::new()
            .route(
                "/ner",
                post(|| async {
                    axum::Json(serde_json::json!([
                        { "entity_group": "PROBLEM", "word": "fever", "score": 0.98,
                          "start": 9, "end": 14 },
                        { "entity_group": "PROBLEM", "word": "cough", "score": 0.91,
                          "start": 19, "end": 24 }
                    ]))
                }),
            )
            .route(
                "/loading",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model is loading") }),
            )
            .route("/garbage", post(|| async { "not json" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    /// The blocking client must be built, used and dropped off the async runtime.
    async fn recognize_at(
        url: String,
        text: &'static str,
    ) -> Result<Vec<RecognizedEntity>, ExternalCallError> {
        tokio::task::spawn_blocking(move || {
            HttpEntityRecognizer::new(&url, 5).unwrap().recognize(text)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn decodes_aggregated_entities_with_offsets() {
        let addr = stub_server().await;
        let entities = recognize_at(format!("http://{addr}/ner"), "I have a fever and cough")
            .await
            .unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_group, "PROBLEM");
        assert_eq!(entities[0].word, "fever");
        assert!((entities[1].score.unwrap() - 0.91).abs() < 1e-6);
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let addr = stub_server().await;
        let err = recognize_at(format!("http://{addr}/loading"), "fever")
            .await
            .unwrap_err();
        match err {
            ExternalCallError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model is loading");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let addr = stub_server().await;
        let err = recognize_at(format!("http://{addr}/garbage"), "fever")
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalCallError::Decode { .. }));
    }

    #[test]
    fn endpoint_trailing_slash_trimmed() {
        let recognizer = HttpEntityRecognizer::new("http://127.0.0.1:9/ner/", 1).unwrap();
        assert_eq!(recognizer.endpoint(), "http://127.0.0.1:9/ner");
    }

    #[test]
    fn unreachable_endpoint_is_an_external_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let recognizer = HttpEntityRecognizer::new("http://127.0.0.1:9/ner", 2).unwrap();
        let err = recognizer.recognize("I have a fever").unwrap_err();
        assert!(matches!(
            err,
            ExternalCallError::Unreachable { .. } | ExternalCallError::Computation(_)
        ));
    }
}
