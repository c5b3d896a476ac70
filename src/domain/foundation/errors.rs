//! Error types for the domain layer.

use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Response codes written into the `code` field of every error envelope.
///
/// Each code carries a fixed client-facing message and HTTP status. Internal
/// error detail never reaches the client; only these messages do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Credential validation
    UnknownToken,
    WrongSignatureToken,
    MalformedToken,
    UnsupportedToken,
    InvalidClaimsToken,
    InvalidTypeToken,
    ExpiredToken,

    // Refresh flow
    TokenReissued,
    MalformedRefreshToken,
    UsedRefreshToken,

    // Logout flow
    LogoutFailMalformedToken,
    LogoutFailUsedToken,
    LogoutFailDbError,

    // Authorization
    AccessDenied,

    // Live view-count path
    CacheNotFound,
    ValidationFailed,
    IoError,

    // Infrastructure
    DatabaseError,
    UnknownError,
}

impl ErrorCode {
    /// Client-facing message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::UnknownToken => "Token does not exist.",
            ErrorCode::WrongSignatureToken => "Invalid JWT signature.",
            ErrorCode::MalformedToken => "Invalid JWT token.",
            ErrorCode::UnsupportedToken => "Unsupported token.",
            ErrorCode::InvalidClaimsToken => "Invalid claims in JWT token.",
            ErrorCode::InvalidTypeToken => "Token type does not match.",
            ErrorCode::ExpiredToken => "Token has expired.",
            ErrorCode::TokenReissued => {
                "Expired access token. A new refresh token has been issued."
            }
            ErrorCode::MalformedRefreshToken => "Expired access token. Refresh token is invalid.",
            ErrorCode::UsedRefreshToken => {
                "Expired access token. Refresh token has already been used."
            }
            ErrorCode::LogoutFailMalformedToken => "Refresh token is malformed or invalid.",
            ErrorCode::LogoutFailUsedToken => "Refresh token has already been used.",
            ErrorCode::LogoutFailDbError => "Failed to remove refresh token from the database",
            ErrorCode::AccessDenied => "Access denied.",
            ErrorCode::CacheNotFound => "Requested data is not cached.",
            ErrorCode::ValidationFailed => "Request validation failed.",
            ErrorCode::IoError => "Failed to read or write shared data.",
            ErrorCode::DatabaseError => "Database operation failed.",
            ErrorCode::UnknownError => "Unknown error. Please contact the administrator.",
        }
    }

    /// HTTP status code for this code.
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::TokenReissued => 401,
            ErrorCode::AccessDenied => 403,
            ErrorCode::CacheNotFound => 404,
            ErrorCode::LogoutFailDbError | ErrorCode::IoError | ErrorCode::DatabaseError => 500,
            _ => 400,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::UnknownToken => "UNKNOWN_TOKEN",
            ErrorCode::WrongSignatureToken => "WRONG_SIGNATURE_TOKEN",
            ErrorCode::MalformedToken => "MALFORMED_TOKEN",
            ErrorCode::UnsupportedToken => "UNSUPPORTED_TOKEN",
            ErrorCode::InvalidClaimsToken => "INVALID_CLAIMS_TOKEN",
            ErrorCode::InvalidTypeToken => "INVALID_TYPE_TOKEN",
            ErrorCode::ExpiredToken => "EXPIRED_TOKEN",
            ErrorCode::TokenReissued => "TOKEN_REISSUED",
            ErrorCode::MalformedRefreshToken => "MALFORMED_REFRESH_TOKEN",
            ErrorCode::UsedRefreshToken => "USED_REFRESH_TOKEN",
            ErrorCode::LogoutFailMalformedToken => "LOGOUT_FAIL_MALFORMED_TOKEN",
            ErrorCode::LogoutFailUsedToken => "LOGOUT_FAIL_USED_TOKEN",
            ErrorCode::LogoutFailDbError => "LOGOUT_FAIL_DB_ERROR",
            ErrorCode::AccessDenied => "ACCESS_DENIED_TOKEN",
            ErrorCode::CacheNotFound => "CACHE_NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Infrastructure failure carrying a response code and an internal message.
///
/// The message is for logs; clients only ever see `code.message()`.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
