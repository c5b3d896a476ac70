//! Live socket topics, one per channel.
//!
//! Each topic is a broadcast channel of raw payloads. Subscribers that fall
//! more than `capacity` messages behind lose the oldest ones.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use crate::domain::catalog::ChannelName;

pub struct TopicHub {
    topics: RwLock<HashMap<ChannelName, broadcast::Sender<String>>>,
    capacity: usize,
}

impl TopicHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Receiver for `channel`'s topic, creating the topic if needed.
    pub async fn subscribe(&self, channel: &ChannelName) -> broadcast::Receiver<String> {
        let mut topics = self.topics.write().await;
        topics
            .entry(channel.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver `payload` to current subscribers. Returns how many received it.
    pub async fn publish(&self, channel: &ChannelName, payload: String) -> usize {
        let topics = self.topics.read().await;
        match topics.get(channel) {
            // no receivers is fine
            Some(sender) => sender.send(payload).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop the topic once its last subscriber is gone.
    pub async fn release(&self, channel: &ChannelName) {
        let mut topics = self.topics.write().await;
        if topics
            .get(channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            topics.remove(channel);
        }
    }

    pub async fn subscriber_count(&self, channel: &ChannelName) -> usize {
        self.topics
            .read()
            .await
            .get(channel)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_topics(&self) -> Vec<ChannelName> {
        self.topics.read().await.keys().cloned().collect()
    }
}

impl Default for TopicHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apm() -> ChannelName {
        ChannelName::new("apm").unwrap()
    }

    #[tokio::test]
    async fn publish_without_topic_reaches_nobody() {
        let hub = TopicHub::default();
        assert_eq!(hub.publish(&apm(), "x".into()).await, 0);
        assert!(hub.active_topics().await.is_empty());
    }

    #[tokio::test]
    async fn every_subscriber_receives_in_order() {
        let hub = TopicHub::default();
        let mut a = hub.subscribe(&apm()).await;
        let mut b = hub.subscribe(&apm()).await;

        assert_eq!(hub.publish(&apm(), "1".into()).await, 2);
        assert_eq!(hub.publish(&apm(), "2".into()).await, 2);

        assert_eq!(a.recv().await.unwrap(), "1");
        assert_eq!(a.recv().await.unwrap(), "2");
        assert_eq!(b.recv().await.unwrap(), "1");
        assert_eq!(b.recv().await.unwrap(), "2");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let hub = TopicHub::default();
        let chung = ChannelName::new("chung").unwrap();
        let mut rx = hub.subscribe(&chung).await;

        hub.publish(&apm(), "apm-only".into()).await;
        hub.publish(&chung, "chung".into()).await;

        assert_eq!(rx.recv().await.unwrap(), "chung");
    }

    #[tokio::test]
    async fn release_keeps_topics_with_subscribers() {
        let hub = TopicHub::default();
        let rx = hub.subscribe(&apm()).await;

        hub.release(&apm()).await;
        assert_eq!(hub.subscriber_count(&apm()).await, 1);

        drop(rx);
        hub.release(&apm()).await;
        assert!(hub.active_topics().await.is_empty());
    }
}
