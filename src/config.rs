//! Router configuration
//!
//! Read once at process start (TOML file, then environment overrides) and
//! passed into the router by reference. Nothing reads the environment after
//! startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::provider::nats::NatsConfig;
use crate::types::Severity;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "A3S_LOGROUTE_";

/// One channel id per severity
///
/// Struct fields rather than a map so every severity always has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    pub info: String,
    pub debug: String,
    pub warning: String,
    pub error: String,
    pub critical: String,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            info: "logs.info".to_string(),
            debug: "logs.debug".to_string(),
            warning: "logs.warning".to_string(),
            error: "logs.error".to_string(),
            critical: "logs.critical".to_string(),
        }
    }
}

impl ChannelMap {
    /// Channel id for a severity
    pub fn channel(&self, severity: Severity) -> &str {
        match severity {
            Severity::Info => &self.info,
            Severity::Debug => &self.debug,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
            Severity::Critical => &self.critical,
        }
    }

    fn channel_mut(&mut self, severity: Severity) -> &mut String {
        match severity {
            Severity::Info => &mut self.info,
            Severity::Debug => &mut self.debug,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
            Severity::Critical => &mut self.critical,
        }
    }

    /// All channel ids in severity order
    pub fn all(&self) -> Vec<String> {
        Severity::ALL
            .iter()
            .map(|s| self.channel(*s).to_string())
            .collect()
    }
}

/// Critical alert delivery; alerts are sent only when both fields are set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// HTTP endpoint accepting `{to, subject, body}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl AlertConfig {
    /// `(recipient, endpoint)` when alerting is fully configured
    pub fn target(&self) -> Option<(&str, &str)> {
        match (self.recipient.as_deref(), self.endpoint.as_deref()) {
            (Some(recipient), Some(endpoint)) => Some((recipient, endpoint)),
            _ => None,
        }
    }
}

/// Channel transport selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherBackend {
    #[default]
    Nats,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub backend: PublisherBackend,

    #[serde(default)]
    pub nats: NatsConfig,
}

/// Durable store selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sled,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database directory (sled)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Tree holding log records
    #[serde(default = "default_tree")]
    pub tree: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/logroute")
}

fn default_tree() -> String {
    "application_logs".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            tree: default_tree(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Bind address string (e.g., "127.0.0.1:8088")
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete process configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub channels: ChannelMap,

    #[serde(default)]
    pub alert: AlertConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl RouterConfig {
    /// Parse a TOML config file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RouterError::Config(format!("Invalid config: {}", e)))
    }

    /// Load from an optional path, apply environment overrides, validate
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `A3S_LOGROUTE_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup; empty values count as unset
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty())
        };

        for severity in Severity::ALL {
            if let Some(channel) = get(&format!("CHANNEL_{}", severity.as_str())) {
                *self.channels.channel_mut(severity) = channel;
            }
        }
        if let Some(recipient) = get("ALERT_RECIPIENT") {
            self.alert.recipient = Some(recipient);
        }
        if let Some(endpoint) = get("ALERT_ENDPOINT") {
            self.alert.endpoint = Some(endpoint);
        }
        if let Some(url) = get("NATS_URL") {
            self.publisher.nats.url = url;
        }
        if let Some(path) = get("STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }

    /// Every severity must map to a non-empty channel id
    pub fn validate(&self) -> Result<()> {
        for severity in Severity::ALL {
            if self.channels.channel(severity).trim().is_empty() {
                return Err(RouterError::Config(format!(
                    "No channel configured for severity {}",
                    severity
                )));
            }
        }
        Ok(())
    }
}
