//! NATS JetStream client: connect, ensure the log stream, publish

use super::config::{NatsConfig, StorageType};
use crate::error::{Result, RouterError};
use async_nats::jetstream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// NATS JetStream client
///
/// Owns the connection and a single stream whose subjects are the
/// configured channel ids.
pub struct NatsClient {
    /// NATS client connection
    client: async_nats::Client,

    /// JetStream context
    jetstream: jetstream::Context,

    /// JetStream stream handle (Mutex for methods requiring &mut self)
    stream: Mutex<jetstream::stream::Stream>,

    config: Arc<NatsConfig>,

    subjects: Vec<String>,
}

impl NatsClient {
    /// Connect to NATS and make sure a stream captures every channel subject
    pub async fn connect(config: NatsConfig, subjects: Vec<String>) -> Result<Self> {
        let connect_opts = build_connect_options(&config);

        let client = connect_opts
            .connect(&config.url)
            .await
            .map_err(|e| RouterError::Connection(format!("{}: {}", config.url, e)))?;

        tracing::info!(url = %config.url, "Connected to NATS");

        let jetstream = jetstream::new(client.clone());
        let stream = ensure_stream(&jetstream, &config, &subjects).await?;

        Ok(Self {
            client,
            jetstream,
            stream: Mutex::new(stream),
            config: Arc::new(config),
            subjects,
        })
    }

    /// Publish a payload, returning the JetStream sequence number
    pub async fn publish(&self, channel: &str, payload: &[u8]) -> Result<u64> {
        let ack = self
            .jetstream
            .publish(channel.to_string(), bytes::Bytes::copy_from_slice(payload))
            .await
            .map_err(|e| RouterError::Publish {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?
            .await
            .map_err(|e| RouterError::Publish {
                channel: channel.to_string(),
                reason: format!("ack failed: {}", e),
            })?;

        tracing::debug!(
            channel,
            stream = %ack.stream,
            sequence = ack.sequence,
            "Log event published"
        );

        Ok(ack.sequence)
    }

    /// Get stream info
    pub async fn stream_info(&self) -> Result<StreamInfo> {
        let mut stream = self.stream.lock().await;
        let info = stream
            .info()
            .await
            .map_err(|e| RouterError::Stream(format!("Failed to get stream info: {}", e)))?;

        Ok(StreamInfo {
            messages: info.state.messages,
            bytes: info.state.bytes,
            last_sequence: info.state.last_sequence,
        })
    }

    /// True while the underlying connection is up
    pub fn is_connected(&self) -> bool {
        self.client.connection_state() == async_nats::connection::State::Connected
    }

    /// Subjects captured by the stream
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsConfig {
        &self.config
    }
}

/// Summary of stream state
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub messages: u64,
    pub bytes: u64,
    pub last_sequence: u64,
}

/// Build NATS connect options from config
fn build_connect_options(config: &NatsConfig) -> async_nats::ConnectOptions {
    let mut opts = async_nats::ConnectOptions::new()
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .request_timeout(Some(Duration::from_secs(config.request_timeout_secs)));

    if let Some(ref token) = config.token {
        opts = opts.token(token.clone());
    }

    opts
}

/// Ensure the JetStream stream exists and captures the channel subjects
async fn ensure_stream(
    js: &jetstream::Context,
    config: &NatsConfig,
    subjects: &[String],
) -> Result<jetstream::stream::Stream> {
    let storage = match config.storage {
        StorageType::File => jetstream::stream::StorageType::File,
        StorageType::Memory => jetstream::stream::StorageType::Memory,
    };

    let max_age = if config.max_age_secs > 0 {
        Duration::from_secs(config.max_age_secs)
    } else {
        Duration::ZERO
    };

    let mut unique = subjects.to_vec();
    unique.sort();
    unique.dedup();

    let stream_config = jetstream::stream::Config {
        name: config.stream_name.clone(),
        subjects: unique.clone(),
        storage,
        max_messages: config.max_events,
        max_age,
        max_bytes: config.max_bytes,
        retention: jetstream::stream::RetentionPolicy::Limits,
        ..Default::default()
    };

    let stream = js
        .get_or_create_stream(stream_config)
        .await
        .map_err(|e| RouterError::Stream(format!(
            "Failed to create/get stream '{}': {}",
            config.stream_name, e
        )))?;

    tracing::info!(
        stream = %config.stream_name,
        subjects = ?unique,
        "JetStream stream ready"
    );

    Ok(stream)
}
