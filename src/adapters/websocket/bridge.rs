//! Broker-to-socket bridge.
//!
//! ```text
//! PUBLISH apm {...} ──► MessageBroker::subscribe ──► PubSubBridge ──► TopicHub "/apm"
//! ```
//!
//! Payloads are forwarded unchanged. Order within a channel follows the
//! broker's delivery order. When the broker stream ends the bridge
//! resubscribes with exponential backoff; messages published while it is
//! down are lost, as with any Redis pub/sub subscriber.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinHandle;

use super::topics::TopicHub;
use crate::domain::catalog::ChannelName;
use crate::ports::{BrokerStream, CacheError, MessageBroker};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

pub struct PubSubBridge {
    broker: Arc<dyn MessageBroker>,
    topics: Arc<TopicHub>,
}

impl PubSubBridge {
    pub fn new(broker: Arc<dyn MessageBroker>, topics: Arc<TopicHub>) -> Self {
        Self { broker, topics }
    }

    /// Subscribe to `channels`, then forward in a background task.
    ///
    /// The first subscription is established before this returns, so
    /// anything published afterwards is delivered. The task only finishes
    /// if it panics.
    pub async fn start(self, channels: &[ChannelName]) -> Result<JoinHandle<()>, CacheError> {
        let stream = self.broker.subscribe(channels).await?;
        tracing::info!(
            channels = ?channels.iter().map(ChannelName::as_str).collect::<Vec<_>>(),
            "Pub/sub bridge subscribed"
        );
        Ok(tokio::spawn(self.run(stream, channels.to_vec())))
    }

    async fn run(self, mut stream: BrokerStream, channels: Vec<ChannelName>) {
        loop {
            forward(&mut stream, &self.topics).await;
            tracing::warn!("Broker subscription ended; resubscribing");
            stream = self.resubscribe(&channels).await;
        }
    }

    async fn resubscribe(&self, channels: &[ChannelName]) -> BrokerStream {
        let mut delay = RECONNECT_DELAY;
        loop {
            tokio::time::sleep(delay).await;
            match self.broker.subscribe(channels).await {
                Ok(stream) => {
                    tracing::info!("Pub/sub bridge resubscribed");
                    return stream;
                }
                Err(e) => {
                    delay = (delay * 2).min(MAX_RECONNECT_DELAY);
                    tracing::warn!(retry_in = ?delay, "Resubscribe failed: {}", e);
                }
            }
        }
    }
}

async fn forward(stream: &mut BrokerStream, topics: &TopicHub) {
    while let Some(message) = stream.next().await {
        let delivered = topics.publish(&message.channel, message.payload).await;
        tracing::debug!(channel = %message.channel, delivered, "Forwarded broker message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMessageBroker;
    use crate::ports::BrokerMessage;
    use async_trait::async_trait;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Hands out one queued stream per subscribe call; `None` entries fail.
    struct ScriptedBroker {
        streams: Mutex<VecDeque<Option<UnboundedReceiver<BrokerMessage>>>>,
        subscribes: AtomicUsize,
    }

    impl ScriptedBroker {
        fn new(streams: Vec<Option<UnboundedReceiver<BrokerMessage>>>) -> Self {
            Self {
                streams: Mutex::new(streams.into()),
                subscribes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MessageBroker for ScriptedBroker {
        async fn publish(&self, _channel: &ChannelName, _payload: &str) -> Result<usize, CacheError> {
            Ok(0)
        }

        async fn subscribe(&self, _channels: &[ChannelName]) -> Result<BrokerStream, CacheError> {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            let next = self.streams.lock().unwrap().pop_front().flatten();
            match next {
                Some(receiver) => Ok(Box::pin(receiver)),
                None => Err(CacheError::Unavailable("connection refused".into())),
            }
        }
    }

    fn message(channel: &ChannelName, payload: &str) -> BrokerMessage {
        BrokerMessage {
            channel: channel.clone(),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn forwards_raw_payload_to_same_name_topic() {
        let broker = Arc::new(InMemoryMessageBroker::new());
        let topics = Arc::new(TopicHub::default());
        let apm = ChannelName::new("apm").unwrap();
        let mut rx = topics.subscribe(&apm).await;

        let _task = PubSubBridge::new(broker.clone(), topics.clone())
            .start(&[apm.clone()])
            .await
            .unwrap();

        broker
            .publish(&apm, r#"{"product_id":42,"view_count":3}"#)
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"product_id":42,"view_count":3}"#
        );
    }

    #[tokio::test]
    async fn unsubscribed_channels_are_not_forwarded() {
        let broker = Arc::new(InMemoryMessageBroker::new());
        let topics = Arc::new(TopicHub::default());
        let apm = ChannelName::new("apm").unwrap();
        let dong = ChannelName::new("dong").unwrap();
        let mut dong_rx = topics.subscribe(&dong).await;
        let mut apm_rx = topics.subscribe(&apm).await;

        let _task = PubSubBridge::new(broker.clone(), topics.clone())
            .start(&[apm.clone()])
            .await
            .unwrap();

        broker.publish(&dong, "ignored").await.unwrap();
        broker.publish(&apm, "seen").await.unwrap();

        // apm arrives after dong was filtered out
        assert_eq!(apm_rx.recv().await.unwrap(), "seen");
        assert!(dong_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn resubscribes_after_the_broker_stream_ends() {
        let apm = ChannelName::new("apm").unwrap();
        let (first_tx, first_rx) = unbounded();
        let (second_tx, second_rx) = unbounded();
        // the second subscribe attempt fails, the third succeeds
        let broker = Arc::new(ScriptedBroker::new(vec![Some(first_rx), None, Some(second_rx)]));
        let topics = Arc::new(TopicHub::default());
        let mut rx = topics.subscribe(&apm).await;

        let task = PubSubBridge::new(broker.clone(), topics.clone())
            .start(&[apm.clone()])
            .await
            .unwrap();

        first_tx.unbounded_send(message(&apm, "before")).unwrap();
        drop(first_tx);
        second_tx.unbounded_send(message(&apm, "after")).unwrap();

        assert_eq!(rx.recv().await.unwrap(), "before");
        assert_eq!(rx.recv().await.unwrap(), "after");
        assert_eq!(broker.subscribes.load(Ordering::SeqCst), 3);
        assert!(!task.is_finished());
    }

    #[tokio::test]
    async fn initial_subscribe_failure_is_reported() {
        let apm = ChannelName::new("apm").unwrap();
        let broker = Arc::new(ScriptedBroker::new(vec![None]));

        let result = PubSubBridge::new(broker, Arc::new(TopicHub::default()))
            .start(&[apm])
            .await;

        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
