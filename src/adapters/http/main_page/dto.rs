//! Response bodies for the main-page endpoints.

use serde::Serialize;

use crate::domain::catalog::ViewCountUpdate;

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStoredResponse {
    pub mall_name: String,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewCountResponse {
    pub mall_name: String,
    pub product_id: i64,
    pub view_count: i64,
}

impl From<ViewCountUpdate> for ViewCountResponse {
    fn from(update: ViewCountUpdate) -> Self {
        Self {
            mall_name: update.mall_name.as_str().to_string(),
            product_id: update.product_id.value(),
            view_count: update.view_count,
        }
    }
}

/// Seconds until the snapshot expires; `-2` when absent.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingTimeResponse {
    pub mall_name: String,
    pub remaining_secs: i64,
}
