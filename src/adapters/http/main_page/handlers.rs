//! HTTP handlers for the main-page snapshot endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{RemainingTimeResponse, SnapshotStoredResponse, ViewCountResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::{ApiError, ApiResponse};
use crate::adapters::http::state::AppState;
use crate::domain::catalog::{ProductTree, SNAPSHOT_TTL_SECS};
use crate::domain::foundation::ProductId;

/// POST /api/main/set/scheduled_product
///
/// Scheduler upload. Replaces the snapshot for the tree's `mall_name`.
pub async fn store_snapshot(
    State(state): State<AppState>,
    Json(tree): Json<ProductTree>,
) -> Result<ApiResponse<SnapshotStoredResponse>, ApiError> {
    let channel = state.channels.resolve(&tree.mall_name)?;
    state.view_counts.store_snapshot(&channel, &tree).await?;

    Ok(ApiResponse::ok(SnapshotStoredResponse {
        mall_name: channel.as_str().to_string(),
        ttl_secs: SNAPSHOT_TTL_SECS,
    }))
}

/// GET /api/main/get/scheduledProduct/:mall_name
pub async fn get_snapshot(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(mall_name): Path<String>,
) -> Result<ApiResponse<ProductTree>, ApiError> {
    let channel = state.channels.resolve(&mall_name)?;
    let tree = state.view_counts.live_snapshot(&channel).await?;
    Ok(ApiResponse::ok(tree))
}

/// POST /api/main/set/scheduledProduct/incrementViewCount/:mall_name/:product_id
pub async fn increment_view_count(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path((mall_name, product_id)): Path<(String, String)>,
) -> Result<ApiResponse<ViewCountResponse>, ApiError> {
    let channel = state.channels.resolve(&mall_name)?;
    let product: ProductId = product_id.parse()?;

    let update = state.view_counts.publish_increment(&channel, product).await?;
    tracing::debug!(user_id = %principal.id, channel = %channel, product_id = %product, "View counted");

    Ok(ApiResponse::ok(update.into()))
}

/// GET /api/main/get/remaining_time/:mall_name
pub async fn remaining_time(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(mall_name): Path<String>,
) -> Result<ApiResponse<RemainingTimeResponse>, ApiError> {
    let channel = state.channels.resolve(&mall_name)?;
    let remaining_secs = state.view_counts.remaining_ttl(&channel).await?;

    Ok(ApiResponse::ok(RemainingTimeResponse {
        mall_name: channel.as_str().to_string(),
        remaining_secs,
    }))
}
