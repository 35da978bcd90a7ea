//! Access log for the sync endpoints.

use std::time::Instant;

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// One line per request: route, client agent, status and elapsed time.
/// Server errors are logged at `warn`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        warn!(path = %path, agent = %agent, status, elapsed_ms, "Sync request failed");
    } else {
        info!(path = %path, agent = %agent, status, elapsed_ms, "Sync request");
    }

    response
}
