//! Error values leaving the handlers.
//!
//! The handler only marks the response as failed and attaches the error;
//! [`crate::middleware::capture`] decides what the client gets to see.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shopsync_core::error::{AppError, ErrorKind};

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Attached to failed responses for the capture middleware.
#[derive(Debug, Clone)]
pub struct CapturedError(pub Arc<AppError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(CapturedError(Arc::new(self.0)));
        response
    }
}
