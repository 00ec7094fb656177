//! NATS JetStream connection and stream settings

use serde::{Deserialize, Serialize};

/// JetStream storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    File,
    Memory,
}

/// NATS publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// Server URL
    pub url: String,

    /// Stream capturing every channel subject
    pub stream_name: String,

    pub storage: StorageType,

    /// Maximum retained messages (-1 = unlimited)
    pub max_events: i64,

    /// Maximum message age in seconds (0 = unlimited)
    pub max_age_secs: u64,

    /// Maximum stream size in bytes (-1 = unlimited)
    pub max_bytes: i64,

    pub connect_timeout_secs: u64,

    pub request_timeout_secs: u64,

    /// Optional auth token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://127.0.0.1:4222".to_string(),
            stream_name: "A3S_LOGS".to_string(),
            storage: StorageType::File,
            max_events: 100_000,
            max_age_secs: 7 * 24 * 3600,
            max_bytes: -1,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            token: None,
        }
    }
}
