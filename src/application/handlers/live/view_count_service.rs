//! ViewCountService - counter mutation, event publication and snapshot reads.

use std::sync::Arc;

use crate::domain::catalog::{ChannelName, ProductTree, ViewCountUpdate};
use crate::domain::foundation::ProductId;
use crate::ports::{CacheError, MessageBroker, ViewCounterCache};

pub struct ViewCountService {
    cache: Arc<dyn ViewCounterCache>,
    broker: Arc<dyn MessageBroker>,
}

impl ViewCountService {
    pub fn new(cache: Arc<dyn ViewCounterCache>, broker: Arc<dyn MessageBroker>) -> Self {
        Self { cache, broker }
    }

    /// Increment the counter, then publish the new count on the channel.
    ///
    /// The two steps are independent. If publishing fails the increment
    /// stands and the error is returned; subscribers miss that update until
    /// the next one.
    pub async fn publish_increment(
        &self,
        channel: &ChannelName,
        product: ProductId,
    ) -> Result<ViewCountUpdate, CacheError> {
        let count = self.cache.increment(channel, product).await?;
        let update = ViewCountUpdate::new(channel.clone(), product, count);
        let payload = serde_json::to_string(&update)?;

        match self.broker.publish(channel, &payload).await {
            Ok(receivers) => {
                tracing::debug!(
                    channel = %channel,
                    product_id = %product,
                    view_count = count,
                    receivers,
                    "Published view count"
                );
                Ok(update)
            }
            Err(err) => {
                tracing::warn!(
                    channel = %channel,
                    product_id = %product,
                    view_count = count,
                    "Counter incremented but publish failed: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Replace the cached tree for `channel`.
    pub async fn store_snapshot(
        &self,
        channel: &ChannelName,
        tree: &ProductTree,
    ) -> Result<(), CacheError> {
        self.cache.set_snapshot(channel, tree).await?;
        tracing::info!(channel = %channel, shops = tree.shop_list.len(), "Snapshot stored");
        Ok(())
    }

    /// Cached tree with live counters merged in. The stored snapshot is not
    /// modified.
    pub async fn live_snapshot(&self, channel: &ChannelName) -> Result<ProductTree, CacheError> {
        let tree = self.cache.snapshot(channel).await?;
        let counts = self.cache.view_counts(channel).await?;
        Ok(tree.with_view_counts(&counts))
    }

    pub async fn remaining_ttl(&self, channel: &ChannelName) -> Result<i64, CacheError> {
        self.cache.remaining_ttl(channel).await
    }
}
