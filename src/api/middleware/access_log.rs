//! Access logging middleware.
//!
//! Logs every request with method, path, status, request id and latency.
//! Request bodies are never logged: they carry free-text health information.

use std::time::Instant;

use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use super::REQUEST_ID_HEADER;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = request_id(req.headers()).unwrap_or("-").to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, %request_id, latency_ms, "API request failed");
    } else {
        tracing::info!(%method, %path, status, %request_id, latency_ms, "API request");
    }

    response
}

/// The request id assigned by the outer request-id layer, if any.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_request_id_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), None);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), Some("abc-123"));
    }
}
