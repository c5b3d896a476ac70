//! Routes for `/api/main`.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{get_snapshot, increment_view_count, remaining_time, store_snapshot};
use crate::adapters::http::middleware::require_auth;
use crate::adapters::http::state::AppState;

/// Every route except the scheduler upload sits behind `require_auth`.
pub fn main_page_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/get/scheduledProduct/:mall_name", get(get_snapshot))
        .route(
            "/set/scheduledProduct/incrementViewCount/:mall_name/:product_id",
            post(increment_view_count),
        )
        .route("/get/remaining_time/:mall_name", get(remaining_time))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
        // added after route_layer, so left open
        .route("/set/scheduled_product", post(store_snapshot))
}
