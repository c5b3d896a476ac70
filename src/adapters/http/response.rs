//! Response envelope: `{ok, code, message, data}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::ports::CacheError;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            data: Some(data),
        }
    }

    /// Failure envelope. `data` is only populated for the reissue case.
    pub fn fail(code: ErrorCode, data: Option<T>) -> Self {
        Self {
            ok: false,
            code: Some(code.to_string()),
            message: Some(code.message().to_string()),
            data,
        }
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Render `code` with its mapped status.
pub fn error_response(code: ErrorCode) -> Response {
    (status_of(code), ApiResponse::<()>::fail(code, None)).into_response()
}

pub fn status_of(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Handler error. Logged on conversion; only the mapped code is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError(pub ErrorCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.0)
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match &err {
            CacheError::NotFound(key) => tracing::debug!(key = %key, "Cache miss"),
            CacheError::Validation(e) => tracing::debug!("Rejected request: {}", e),
            CacheError::Serialization(_) | CacheError::Unavailable(_) => {
                tracing::error!("Shared cache failure: {}", err)
            }
        }
        ApiError(err.code())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!("Rejected request: {}", err);
        ApiError(ErrorCode::ValidationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_carries_code_and_message() {
        let body = serde_json::to_value(ApiResponse::<()>::fail(ErrorCode::UsedRefreshToken, None))
            .unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "USED_REFRESH_TOKEN");
        assert_eq!(
            body["message"],
            "Expired access token. Refresh token has already been used."
        );
        assert!(body["data"].is_null());
    }

    #[test]
    fn error_response_uses_mapped_status() {
        assert_eq!(
            error_response(ErrorCode::AccessDenied).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(CacheError::NotFound("snapshot:apm".into()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
