//! HTTP middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Request id: assigns `X-Request-Id` and copies it onto the response
//! 2. CORS
//! 3. Access log: one line per request with status and latency

pub mod access_log;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
