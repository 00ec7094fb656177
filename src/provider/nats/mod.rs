//! NATS JetStream channel publisher
//!
//! Implements `ChannelPublisher` on top of JetStream. Each channel id is a
//! subject; one stream retains all of them.

mod client;
mod config;

pub use client::{NatsClient, StreamInfo};
pub use config::{NatsConfig, StorageType};

use crate::config::ChannelMap;
use crate::error::Result;
use crate::provider::{ChannelPublisher, PublishAck};
use async_trait::async_trait;

/// NATS JetStream channel publisher
pub struct NatsPublisher {
    client: NatsClient,
}

impl NatsPublisher {
    /// Connect and ensure a stream over every configured channel
    pub async fn connect(config: NatsConfig, channels: &ChannelMap) -> Result<Self> {
        let client = NatsClient::connect(config, channels.all()).await?;
        Ok(Self { client })
    }

    /// Get the underlying NATS client for advanced usage
    pub fn client(&self) -> &NatsClient {
        &self.client
    }
}

#[async_trait]
impl ChannelPublisher for NatsPublisher {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<PublishAck> {
        let sequence = self.client.publish(channel, payload).await?;
        Ok(PublishAck {
            channel: channel.to_string(),
            sequence,
        })
    }

    fn name(&self) -> &str {
        "nats"
    }

    async fn health(&self) -> Result<bool> {
        if !self.client.is_connected() {
            return Ok(false);
        }
        self.client.stream_info().await.map(|_| true)
    }
}
