//! API router.
//!
//! Middleware stack (outermost → innermost):
//! 1. Request id (set + propagate `X-Request-Id`) → 2. CORS → 3. Access log
//! → 4. Body limit → Handler

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::api::endpoints;
use crate::api::middleware::{self, REQUEST_ID_HEADER};
use crate::api::types::ApiContext;
use crate::config::MAX_BODY_BYTES;

/// Build the full API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let v1 = Router::new()
        .route("/symptoms", post(endpoints::symptoms::check))
        .route("/predict", post(endpoints::predict::predict))
        .route("/explain", post(endpoints::explain::explain))
        .route("/consent", get(endpoints::consent::policy));

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api/v1", v1)
        .with_state(ctx)
        // Layers are applied innermost first:
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
