//! Convenience result type alias for Daghbas Share.

use crate::error::AppError;

/// A specialized `Result` type for Daghbas operations.
pub type AppResult<T> = Result<T, AppError>;
