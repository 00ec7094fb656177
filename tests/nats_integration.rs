//! NATS JetStream integration tests
//!
//! These tests require a running NATS server with JetStream enabled:
//!   nats-server -js
//!
//! Tests are skipped automatically if NATS is not available.

use a3s_logroute::{
    ChannelMap, ChannelPublisher, MemoryLogStore, NatsConfig, NatsPublisher, SeverityRouter,
    StorageType,
};
use serde_json::json;

fn test_channels(suffix: &str) -> ChannelMap {
    ChannelMap {
        info: format!("test.{suffix}.info"),
        debug: format!("test.{suffix}.debug"),
        warning: format!("test.{suffix}.warning"),
        error: format!("test.{suffix}.error"),
        critical: format!("test.{suffix}.critical"),
    }
}

/// Try to connect to NATS. Returns None if server is unavailable.
async fn try_nats_publisher(suffix: &str) -> Option<NatsPublisher> {
    let config = NatsConfig {
        url: "nats://127.0.0.1:4222".to_string(),
        stream_name: format!("TEST_LOGS_{}", suffix.to_uppercase()),
        storage: StorageType::Memory,
        max_events: 10_000,
        max_age_secs: 60,
        connect_timeout_secs: 2,
        ..Default::default()
    };

    match NatsPublisher::connect(config, &test_channels(suffix)).await {
        Ok(publisher) => Some(publisher),
        Err(_) => {
            eprintln!("NATS not available, skipping integration test");
            None
        }
    }
}

/// Helper to create a NATS publisher, or skip the test
macro_rules! nats_publisher {
    ($suffix:expr) => {
        match try_nats_publisher($suffix).await {
            Some(p) => p,
            None => return,
        }
    };
}

#[tokio::test]
async fn test_nats_publish_sequences_increase() {
    let publisher = nats_publisher!("seq");

    let first = publisher
        .publish("test.seq.info", br#"{"message":"a"}"#)
        .await
        .unwrap();
    let second = publisher
        .publish("test.seq.error", br#"{"message":"b"}"#)
        .await
        .unwrap();

    assert!(second.sequence > first.sequence);
    assert_eq!(second.channel, "test.seq.error");
    assert!(publisher.health().await.unwrap());
}

#[tokio::test]
async fn test_nats_publish_to_unknown_subject_fails() {
    let publisher = nats_publisher!("unknown");

    // No stream captures this subject, so JetStream never acks it
    let result = publisher.publish("test.unrelated.subject", b"{}").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_nats_router_end_to_end() {
    let publisher = nats_publisher!("e2e");
    let router = SeverityRouter::new(test_channels("e2e"), publisher, MemoryLogStore::new());

    let response = router
        .handle(&json!({
            "log_level": "ERROR",
            "message": "disk full",
            "details": "/var full",
            "source_application": "billing",
        }))
        .await
        .unwrap();
    assert_eq!(response.status_code, 200);

    let info = router.publisher().health().await.unwrap();
    assert!(info);
}
