//! Transfer error type.

use thiserror::Error;

use shopsync_core::error::{AppError, ErrorKind};

use crate::upload::UploadErrorCode;

/// Errors that abort a sync request during upload handling.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The upload descriptor was rejected.
    #[error("upload rejected (code {}): {diagnostic}", .code.code())]
    InvalidUpload {
        code: UploadErrorCode,
        diagnostic: String,
    },

    /// Staging the upload into the scratch area failed.
    #[error("failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),
}

impl TransferError {
    /// Numeric classification carried to the error log.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidUpload { code, .. } => code.code(),
            Self::Staging(_) => UploadErrorCode::CantWrite.code(),
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::Transfer, message, err)
    }
}
