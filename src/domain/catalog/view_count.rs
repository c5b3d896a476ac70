use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ChannelName;
use crate::domain::foundation::ProductId;

/// Current counters for one channel, keyed by raw product id.
pub type ViewCountMap = HashMap<i64, i64>;

/// Event published after a successful increment.
///
/// Serialized as JSON onto the broker channel of the same name and forwarded
/// verbatim to socket subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCountUpdate {
    pub mall_name: ChannelName,
    pub product_id: ProductId,
    pub view_count: i64,
}

impl ViewCountUpdate {
    pub fn new(mall_name: ChannelName, product_id: ProductId, view_count: i64) -> Self {
        Self {
            mall_name,
            product_id,
            view_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_snake_case_fields() {
        let update = ViewCountUpdate::new(
            ChannelName::new("apm").unwrap(),
            ProductId::new(42).unwrap(),
            3,
        );
        let json: serde_json::Value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"mall_name": "apm", "product_id": 42, "view_count": 3})
        );
    }
}
