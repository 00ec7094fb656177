//! # a3s-logroute
//!
//! Severity-routed log fan-out for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-logroute` accepts structured log events, publishes each one to the
//! channel configured for its severity, alerts a recipient on CRITICAL
//! events, and persists every accepted event keyed by severity and
//! processing time. Channel transport, alert delivery, and storage are
//! pluggable.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_logroute::{ChannelMap, MemoryLogStore, MemoryPublisher, SeverityRouter};
//!
//! # async fn example() -> a3s_logroute::Result<()> {
//! let router = SeverityRouter::new(
//!     ChannelMap::default(),
//!     MemoryPublisher::new(),
//!     MemoryLogStore::new(),
//! );
//!
//! let response = router
//!     .handle(&serde_json::json!({
//!         "log_level": "ERROR",
//!         "message": "disk full",
//!         "details": "/var full",
//!         "source_application": "billing",
//!     }))
//!     .await?;
//!
//! assert_eq!(response.status_code, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! - **Publishers**: NATS JetStream, in-memory
//! - **Stores**: sled, in-memory
//! - **Notifiers**: HTTP endpoint, in-memory
//!
//! ## Surfaces
//!
//! - HTTP ingest server (`server`)
//! - Lambda-style handler (`lambda`)
//! - Forwarding client and `tracing` layer for applications (`forward`)

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod forward;
pub mod lambda;
pub mod notify;
pub mod provider;
pub mod router;
pub mod server;
pub mod store;
pub mod types;

// Re-export core types
pub use config::{AlertConfig, ChannelMap, RouterConfig};
pub use error::{Result, RouterError};
pub use forward::{ForwardLayer, LogForwarder, LogSink};
pub use notify::{Alert, HttpNotifier, MemoryNotifier, Notifier};
pub use provider::{ChannelPublisher, PublishAck};
pub use router::SeverityRouter;
pub use store::{LogStore, MemoryLogStore, SledLogStore};
pub use types::{
    LogEvent, LogRecord, LogRequest, RecordKey, ResponseBody, RouteResponse, Severity,
};

// Re-export backends for convenience
pub use provider::memory::{MemoryPublisher, PublishedMessage};
pub use provider::nats::{NatsConfig, NatsPublisher, StorageType};
