//! Convenience result type alias for the seat-lock service.

use crate::error::AppError;

/// A specialized `Result` type for seat-lock operations.
pub type AppResult<T> = Result<T, AppError>;
