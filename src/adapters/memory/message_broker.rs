use async_trait::async_trait;
use futures::stream;
use std::collections::HashSet;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::catalog::ChannelName;
use crate::ports::{BrokerMessage, BrokerStream, CacheError, MessageBroker};

const CAPACITY: usize = 1024;

/// Broadcast-channel broker. Per-channel order is publish order.
pub struct InMemoryMessageBroker {
    sender: broadcast::Sender<BrokerMessage>,
}

impl InMemoryMessageBroker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }
}

impl Default for InMemoryMessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBroker for InMemoryMessageBroker {
    async fn publish(&self, channel: &ChannelName, payload: &str) -> Result<usize, CacheError> {
        let message = BrokerMessage {
            channel: channel.clone(),
            payload: payload.to_string(),
        };
        // No subscribers is not an error, same as Redis PUBLISH returning 0.
        Ok(self.sender.send(message).unwrap_or(0))
    }

    async fn subscribe(&self, channels: &[ChannelName]) -> Result<BrokerStream, CacheError> {
        let wanted: HashSet<ChannelName> = channels.iter().cloned().collect();
        let receiver = self.sender.subscribe();

        let stream = stream::unfold((receiver, wanted), |(mut receiver, wanted)| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) if wanted.contains(&message.channel) => {
                        return Some((message, (receiver, wanted)));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Broker subscriber lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn delivers_only_subscribed_channels_in_order() {
        let broker = InMemoryMessageBroker::new();
        let apm = ChannelName::new("apm").unwrap();
        let dong = ChannelName::new("dong").unwrap();
        let mut stream = broker.subscribe(&[apm.clone()]).await.unwrap();

        broker.publish(&apm, "1").await.unwrap();
        broker.publish(&dong, "ignored").await.unwrap();
        broker.publish(&apm, "2").await.unwrap();

        assert_eq!(stream.next().await.unwrap().payload, "1");
        assert_eq!(stream.next().await.unwrap().payload, "2");
    }

    #[tokio::test]
    async fn publish_without_subscribers_reports_zero() {
        let broker = InMemoryMessageBroker::new();
        let apm = ChannelName::new("apm").unwrap();
        assert_eq!(broker.publish(&apm, "x").await.unwrap(), 0);
    }
}
