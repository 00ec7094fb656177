//! Assemble a `SeverityRouter` from configuration
//!
//! Runs once at startup; every backend is chosen and connected here.

use crate::config::{PublisherBackend, RouterConfig, StoreBackend};
use crate::error::Result;
use crate::provider::memory::MemoryPublisher;
use crate::provider::nats::NatsPublisher;
use crate::provider::ChannelPublisher;
use crate::router::SeverityRouter;
use crate::store::{LogStore, MemoryLogStore, SledLogStore};

/// Connect the configured publisher, open the store, and wire alerts
pub async fn build_router(config: &RouterConfig) -> Result<SeverityRouter> {
    config.validate()?;

    let publisher: Box<dyn ChannelPublisher> = match config.publisher.backend {
        PublisherBackend::Nats => Box::new(
            NatsPublisher::connect(config.publisher.nats.clone(), &config.channels).await?,
        ),
        PublisherBackend::Memory => Box::new(MemoryPublisher::new()),
    };

    let store: Box<dyn LogStore> = match config.store.backend {
        StoreBackend::Sled => Box::new(SledLogStore::open(&config.store.path, &config.store.tree)?),
        StoreBackend::Memory => Box::new(MemoryLogStore::new()),
    };

    tracing::info!(
        publisher = publisher.name(),
        store = store.name(),
        channels = ?config.channels.all(),
        "Severity router configured"
    );

    let router = SeverityRouter::from_boxed(config.channels.clone(), publisher, store)
        .with_alerts(&config.alert);
    Ok(router)
}
