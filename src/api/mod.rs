//! HTTP API.
//!
//! `api_router()` returns a composable `Router`: the symptom check and the
//! raw model endpoints under `/api/v1/`, plus `/health`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{serve_until_ctrl_c, start_server_on, ApiServer};
pub use types::ApiContext;
