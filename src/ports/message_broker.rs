//! MessageBroker port - pub/sub transport for view-count events.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use super::CacheError;
use crate::domain::catalog::ChannelName;

/// A message received from a subscribed broker channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub channel: ChannelName,
    pub payload: String,
}

/// Stream of incoming messages. Ends when the broker connection drops.
pub type BrokerStream = Pin<Box<dyn Stream<Item = BrokerMessage> + Send>>;

/// Publish/subscribe over channels named identically to the mall channels.
///
/// Messages on one channel arrive in publish order. Nothing is guaranteed
/// across channels.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish once. Returns the number of subscribers that received it.
    async fn publish(&self, channel: &ChannelName, payload: &str) -> Result<usize, CacheError>;

    /// Subscribe to every channel in `channels`.
    async fn subscribe(&self, channels: &[ChannelName]) -> Result<BrokerStream, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_broker_is_object_safe() {
        fn _accepts_dyn(_broker: &dyn MessageBroker) {}
    }
}
