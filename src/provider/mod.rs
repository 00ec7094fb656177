//! Channel publisher trait: the transport abstraction for routed log events
//!
//! Every channel backend (NATS, in-memory, ...) implements `ChannelPublisher`
//! so the router can dispatch without knowing the transport.

use crate::error::Result;
use async_trait::async_trait;

pub mod memory;
pub mod nats;

/// Core trait for channel backends
///
/// `publish` returns once the backend has acknowledged the message; it never
/// waits on downstream consumers.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Publish a serialized payload to one channel
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<PublishAck>;

    /// Backend name (e.g., "nats", "memory")
    fn name(&self) -> &str;

    /// Health check: returns true if the backend is connected
    async fn health(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Backend acknowledgment of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    /// Channel the payload was published to
    pub channel: String,

    /// Backend-assigned sequence number
    pub sequence: u64,
}
