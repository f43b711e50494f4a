//! Convenience result type alias for Jewelbox.

use crate::error::AppError;

/// A specialized `Result` type for Jewelbox operations.
pub type AppResult<T> = Result<T, AppError>;
