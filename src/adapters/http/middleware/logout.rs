//! Logout filter.
//!
//! Intercepts `POST /api/logout` before routing. The refresh cookie is
//! cleared whatever the outcome.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::response::{status_of, ApiResponse};
use crate::adapters::http::state::AppState;
use crate::domain::auth::LogoutOutcome;

pub const LOGOUT_PATH: &str = "/api/logout";

pub async fn logout_filter(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() != Method::POST || request.uri().path() != LOGOUT_PATH {
        return next.run(request).await;
    }

    let refresh_cookie = state.refresh_cookie.extract(request.headers());
    let outcome = state.gate.logout(refresh_cookie.as_deref()).await;

    let mut headers = HeaderMap::new();
    state.refresh_cookie.append_deletion(&mut headers);

    match outcome {
        LogoutOutcome::LoggedOut => (headers, ApiResponse::empty()).into_response(),
        LogoutOutcome::Failed(code) => {
            tracing::warn!(code = %code, "Logout failed");
            (status_of(code), headers, ApiResponse::<()>::fail(code, None)).into_response()
        }
    }
}
