//! Sync endpoint handlers.

use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;

use shopsync_core::error::AppError;
use shopsync_core::result::AppResult;
use shopsync_service::SyncResponse;

use crate::error::ApiError;
use crate::form::SyncForm;
use crate::render;
use crate::state::AppState;

/// POST /sync/{request_type}
pub async fn sync(
    State(state): State<AppState>,
    Path(request_type): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, ApiError> {
    dispatch(&state, request_type, &headers, request).await
}

/// Extract the form, run the dispatcher under the request timeout and
/// render the result.
pub(crate) async fn dispatch(
    state: &AppState,
    request_type: String,
    headers: &HeaderMap,
    request: Request,
) -> Result<Response, ApiError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let form = SyncForm::extract(request, state.config.server.max_upload_size_bytes).await?;
    // Removes the spooled upload unless the dispatcher moved it.
    let (sync_request, _spool) = form.into_request(request_type, user_agent.clone());

    let response = run_with_timeout(
        state.config.server.request_timeout_seconds,
        state.dispatcher.start(sync_request),
    )
    .await?;
    Ok(render::render(response, user_agent.as_deref()).await?)
}

async fn run_with_timeout(
    seconds: u64,
    work: impl std::future::Future<Output = AppResult<SyncResponse>>,
) -> AppResult<SyncResponse> {
    match tokio::time::timeout(Duration::from_secs(seconds), work).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!(
            "Maximum execution time of {seconds} seconds exceeded"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use shopsync_core::error::ErrorKind;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_message_is_translatable() {
        let err = run_with_timeout(2, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SyncResponse::Empty)
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(crate::middleware::capture::translate(&err.message).contains("2 Sekunden"));
    }
}
