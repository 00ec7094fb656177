//! In-memory channel publisher
//!
//! Keeps every published message in order. Clones share the same buffer, so
//! a test can hand one clone to the router and inspect another.

use super::{ChannelPublisher, PublishAck};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A message captured by [`MemoryPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub channel: String,
    pub payload: Vec<u8>,
    pub sequence: u64,
}

impl PublishedMessage {
    /// Decode the payload as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

#[derive(Clone, Default)]
pub struct MemoryPublisher {
    messages: Arc<RwLock<Vec<PublishedMessage>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first
    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.read().await.clone()
    }

    /// Messages published to one channel, oldest first
    pub async fn messages_for(&self, channel: &str) -> Vec<PublishedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl ChannelPublisher for MemoryPublisher {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<PublishAck> {
        let mut messages = self.messages.write().await;
        let sequence = messages.len() as u64 + 1;
        messages.push(PublishedMessage {
            channel: channel.to_string(),
            payload: payload.to_vec(),
            sequence,
        });

        tracing::debug!(channel, sequence, "Message published to memory channel");

        Ok(PublishAck {
            channel: channel.to_string(),
            sequence,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_assigns_sequences() {
        let publisher = MemoryPublisher::new();

        let first = publisher.publish("logs.info", b"{}").await.unwrap();
        let second = publisher.publish("logs.error", b"{}").await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.channel, "logs.error");
        assert_eq!(publisher.count().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_buffer() {
        let publisher = MemoryPublisher::new();
        let observer = publisher.clone();

        publisher
            .publish("logs.warning", br#"{"message":"slow"}"#)
            .await
            .unwrap();

        let messages = observer.messages_for("logs.warning").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].json().unwrap()["message"], "slow");
        assert!(observer.messages_for("logs.info").await.is_empty());
    }

    #[tokio::test]
    async fn test_health_default() {
        assert!(MemoryPublisher::new().health().await.unwrap());
    }
}
