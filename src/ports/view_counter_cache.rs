//! ViewCounterCache port - counters and snapshots in the shared store.

use async_trait::async_trait;

use super::CacheError;
use crate::domain::catalog::{ChannelName, ProductTree, ViewCountMap};
use crate::domain::foundation::ProductId;

/// Per-channel view counters and the cached product tree.
///
/// Keyspace: `view_count:<channel>` (hash, no TTL) and
/// `snapshot:<channel>` (string, 300s TTL).
#[async_trait]
pub trait ViewCounterCache: Send + Sync {
    /// Atomically add one to the product's counter and return the new value.
    async fn increment(&self, channel: &ChannelName, product: ProductId)
        -> Result<i64, CacheError>;

    /// All counters for a channel. Missing hash yields an empty map.
    async fn view_counts(&self, channel: &ChannelName) -> Result<ViewCountMap, CacheError>;

    /// Replace the snapshot and reset its TTL to 300 seconds.
    async fn set_snapshot(&self, channel: &ChannelName, tree: &ProductTree)
        -> Result<(), CacheError>;

    /// `CacheError::NotFound` when absent or expired.
    async fn snapshot(&self, channel: &ChannelName) -> Result<ProductTree, CacheError>;

    /// Remaining snapshot lifetime in seconds, Redis-style: `-2` when the key
    /// does not exist, `-1` when it has no expiry.
    async fn remaining_ttl(&self, channel: &ChannelName) -> Result<i64, CacheError>;
}
