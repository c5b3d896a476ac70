//! Redis pub/sub broker.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::unavailable;
use crate::domain::catalog::ChannelName;
use crate::ports::{BrokerMessage, BrokerStream, CacheError, MessageBroker};

/// Publishes on the shared multiplexed connection and opens a dedicated
/// pub/sub connection per `subscribe` call.
#[derive(Clone)]
pub struct RedisMessageBroker {
    client: redis::Client,
    conn: MultiplexedConnection,
    connect_timeout: Duration,
}

impl RedisMessageBroker {
    pub fn new(client: redis::Client, conn: MultiplexedConnection, connect_timeout: Duration) -> Self {
        Self {
            client,
            conn,
            connect_timeout,
        }
    }
}

#[async_trait]
impl MessageBroker for RedisMessageBroker {
    async fn publish(&self, channel: &ChannelName, payload: &str) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        let receivers: usize = conn
            .publish(channel.as_str(), payload)
            .await
            .map_err(unavailable)?;
        Ok(receivers)
    }

    async fn subscribe(&self, channels: &[ChannelName]) -> Result<BrokerStream, CacheError> {
        let conn = tokio::time::timeout(self.connect_timeout, self.client.get_async_connection())
            .await
            .map_err(|_| CacheError::Unavailable("pub/sub connect timed out".into()))?
            .map_err(unavailable)?;
        let mut pubsub = conn.into_pubsub();
        for channel in channels {
            pubsub.subscribe(channel.as_str()).await.map_err(unavailable)?;
        }

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = match ChannelName::new(msg.get_channel_name()) {
                Ok(channel) => channel,
                Err(e) => {
                    tracing::warn!(channel = msg.get_channel_name(), "Dropping message: {}", e);
                    return None;
                }
            };
            match msg.get_payload::<String>() {
                Ok(payload) => Some(BrokerMessage { channel, payload }),
                Err(e) => {
                    tracing::warn!(channel = %channel, "Dropping undecodable payload: {}", e);
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

impl std::fmt::Debug for RedisMessageBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisMessageBroker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running server: REDIS_URL=redis://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn subscriber_receives_published_payload() {
        let url = std::env::var("REDIS_URL").expect("REDIS_URL");
        let client = redis::Client::open(url).unwrap();
        let conn = client.get_multiplexed_tokio_connection().await.unwrap();
        let broker = RedisMessageBroker::new(client, conn, Duration::from_secs(5));
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let channel = ChannelName::new(&format!("it-{}", &suffix[..12])).unwrap();

        let mut stream = broker.subscribe(&[channel.clone()]).await.unwrap();
        assert_eq!(broker.publish(&channel, r#"{"view_count":1}"#).await.unwrap(), 1);

        let message = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.channel, channel);
        assert_eq!(message.payload, r#"{"view_count":1}"#);
    }
}
