//! Route definitions for the gateway.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Headroom over the upload limit for the other form fields, so an
/// oversized archive is reported with its upload code instead of a
/// rejected body.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.server.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    let sync_routes = Router::new()
        .route("/sync/rpc/{handler}", post(handlers::rpc::rpc))
        .route("/sync/{request_type}", post(handlers::sync::sync))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::capture::error_capture,
        ));

    Router::new()
        .merge(sync_routes)
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}
