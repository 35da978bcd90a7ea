//! Secondary RPC endpoint.

use axum::extract::{Path, Request, State};
use axum::http::HeaderMap;
use axum::response::Response;

use shopsync_core::error::AppError;

use crate::error::ApiError;
use crate::handlers::sync::dispatch;
use crate::state::AppState;

/// POST /sync/rpc/{handler}
///
/// Routed through the dispatcher under the handler's sync identifier, so
/// maintenance mode applies here as well.
pub async fn rpc(
    State(state): State<AppState>,
    Path(handler): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, ApiError> {
    let identifier = state
        .dispatcher
        .rpc()
        .identifier_for_route(&handler)
        .ok_or_else(|| AppError::not_found(format!("Unknown RPC handler '{handler}'")))?;
    dispatch(&state, identifier.to_string(), &headers, request).await
}
