use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::adapters::http::middleware::AccessTokenBody;
use crate::adapters::http::response::error_response;
use crate::adapters::http::response::ApiResponse;
use crate::adapters::http::state::AppState;
use crate::domain::auth::Principal;
use crate::domain::foundation::ErrorCode;

/// Called once an upstream identity provider has authenticated `principal`.
///
/// Issues a fresh credential pair, replaces the stored refresh credential
/// and swaps the refresh cookie.
pub async fn login_success(state: &AppState, principal: &Principal) -> Response {
    let pair = match state.gate.credentials().rotate(principal).await {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(user_id = %principal.id, "Login credential issue failed: {}", err);
            return error_response(ErrorCode::UnknownError);
        }
    };

    tracing::info!(user_id = %principal.id, role = ?principal.role, "Login succeeded");

    let mut headers = HeaderMap::new();
    state
        .refresh_cookie
        .append_rotation(&mut headers, &pair.refresh_token);

    (
        headers,
        ApiResponse::ok(AccessTokenBody {
            access_token: pair.access_token,
        }),
    )
        .into_response()
}
