//! Authentication middleware and extractors for axum.
//!
//! ```text
//! Request → auth_filter → Principal or AuthFailure in extensions
//!                              ↓
//!              require_auth (protected routes only)
//!                              ↓ no Principal
//!                     AuthGate::commence → envelope
//! ```
//!
//! `auth_filter` never rejects. Rejection happens in `require_auth`, which
//! consumes the failure marker exactly once.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::adapters::http::response::{error_response, status_of, ApiResponse};
use crate::adapters::http::state::AppState;
use crate::application::FilterResult;
use crate::domain::auth::{GateOutcome, Principal, TokenError};
use crate::domain::foundation::ErrorCode;

/// Socket handshakes authenticate inside the STOMP CONNECT frame instead.
pub const SOCKET_PATH_PREFIX: &str = "/ws";

/// `/ws` itself or anything below `/ws/`.
fn is_socket_path(path: &str) -> bool {
    path.strip_prefix(SOCKET_PATH_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Request-scoped marker left by `auth_filter` when verification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthFailure(pub TokenError);

#[derive(Debug, Serialize)]
pub struct AccessTokenBody {
    pub access_token: String,
}

/// Per-request filter: verifies the bearer credential, if any.
pub async fn auth_filter(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if is_socket_path(request.uri().path()) {
        return next.run(request).await;
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match state.gate.filter(authorization) {
        FilterResult::Authenticated(principal) => {
            request.extensions_mut().insert(principal);
        }
        FilterResult::Failed(err) => {
            tracing::debug!(path = %request.uri().path(), error = %err, "Access credential rejected");
            request.extensions_mut().insert(AuthFailure(err));
        }
        FilterResult::Anonymous => {}
    }

    next.run(request).await
}

/// Authorization for protected routes. Without a principal the entry point
/// decides the response.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.extensions().get::<Principal>().is_some() {
        return next.run(request).await;
    }

    let marker = request.extensions().get::<AuthFailure>().map(|f| f.0);
    let refresh_cookie = state.refresh_cookie.extract(request.headers());

    let outcome = state.gate.commence(marker, refresh_cookie.as_deref()).await;
    render_outcome(&state, outcome)
}

fn render_outcome(state: &AppState, outcome: GateOutcome) -> Response {
    match outcome {
        GateOutcome::Reissued {
            access_token,
            refresh_token,
        } => {
            let code = ErrorCode::TokenReissued;
            let mut headers = HeaderMap::new();
            state
                .refresh_cookie
                .append_rotation(&mut headers, &refresh_token);
            (
                status_of(code),
                headers,
                ApiResponse::fail(code, Some(AccessTokenBody { access_token })),
            )
                .into_response()
        }
        GateOutcome::Rejected(code) => error_response(code),
    }
}

/// Extractor that requires the principal placed by `auth_filter`.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Principal>()
                .cloned()
                .map(RequireAuth)
                .ok_or_else(|| error_response(ErrorCode::AccessDenied))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_covers_endpoint_and_children() {
        assert!(is_socket_path("/ws"));
        assert!(is_socket_path("/ws/"));
        assert!(is_socket_path("/ws/message/increase/product/view_count/apm/1"));
    }

    #[test]
    fn socket_path_excludes_lookalike_prefixes() {
        assert!(!is_socket_path("/wsadmin"));
        assert!(!is_socket_path("/ws-anything"));
        assert!(!is_socket_path("/api/ws"));
    }
}
