use axum::{extract::State, middleware, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::adapters::http::middleware::{require_auth, RequireAuth};
use crate::adapters::http::response::{ApiError, ApiResponse};
use crate::adapters::http::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRequest {
    pub channel: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveResponse {
    pub channel: String,
    /// False when the caller held no membership entry.
    pub removed: bool,
}

/// POST /api/socket/disconnect
///
/// Removes one membership entry for the caller.
pub async fn leave_channel(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(request): Json<LeaveRequest>,
) -> Result<ApiResponse<LeaveResponse>, ApiError> {
    let channel = state.channels.resolve(&request.channel)?;
    let removed = state.membership.leave(&channel, principal.id).await?;
    tracing::info!(user_id = %principal.id, channel = %channel, removed, "Left channel");

    Ok(ApiResponse::ok(LeaveResponse {
        channel: channel.as_str().to_string(),
        removed,
    }))
}

pub fn socket_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/disconnect", post(leave_channel))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
