//! Convenience result type alias for ShopSync.

use crate::error::AppError;

/// A specialized `Result` type for gateway operations.
pub type AppResult<T> = Result<T, AppError>;
