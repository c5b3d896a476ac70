use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors from the shared cache and broker.
///
/// Operations are attempted exactly once; callers get the failure as-is.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Key absent, or its TTL has elapsed
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store unreachable or command failed
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CacheError::NotFound(_) => ErrorCode::CacheNotFound,
            CacheError::Validation(_) => ErrorCode::ValidationFailed,
            CacheError::Serialization(_) | CacheError::Unavailable(_) => ErrorCode::IoError,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}
