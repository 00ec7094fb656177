//! Router integration tests
//!
//! End-to-end tests exercising `SeverityRouter::handle` with in-memory
//! collaborators. Covers per-severity dispatch, rejections, critical alerts,
//! persistence, step ordering, downstream failures, and concurrency.

use a3s_logroute::{
    AlertConfig, ChannelMap, ChannelPublisher, LogRecord, LogStore, MemoryLogStore,
    MemoryNotifier, MemoryPublisher, Notifier, PublishAck, RecordKey, ResponseBody, RouterError,
    Severity, SeverityRouter,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

struct Harness {
    router: SeverityRouter,
    publisher: MemoryPublisher,
    notifier: MemoryNotifier,
    store: MemoryLogStore,
}

fn alert_config() -> AlertConfig {
    AlertConfig {
        recipient: Some("oncall@example.com".to_string()),
        endpoint: Some("https://mailer.example.com/send".to_string()),
    }
}

fn harness(alert: AlertConfig) -> Harness {
    let publisher = MemoryPublisher::new();
    let notifier = MemoryNotifier::new();
    let store = MemoryLogStore::new();
    let router = SeverityRouter::new(ChannelMap::default(), publisher.clone(), store.clone())
        .with_notifier(&alert, notifier.clone());

    Harness {
        router,
        publisher,
        notifier,
        store,
    }
}

fn event(level: &str) -> serde_json::Value {
    json!({
        "log_level": level,
        "message": "disk full",
        "details": "/var full",
        "source_application": "billing",
    })
}

// ─── Accepted events ─────────────────────────────────────────────

#[tokio::test]
async fn test_every_severity_is_accepted_and_echoed() {
    let h = harness(alert_config());

    for severity in Severity::ALL {
        let response = h.router.handle(&event(severity.as_str())).await.unwrap();
        assert_eq!(response.status_code, 200);

        let record = response.record().unwrap();
        assert_eq!(record.severity(), severity);
        assert_eq!(record.event().message(), "disk full");
        assert_eq!(record.event().details(), "/var full");
        assert_eq!(record.event().source_application(), "billing");
        assert!(record.timestamp().timestamp() > 0);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["body"]["timestamp"].is_string());
        assert_eq!(json["body"]["log_level"], severity.as_str());
    }

    assert_eq!(h.publisher.count().await, 5);
    assert_eq!(h.store.len().await, 5);
}

#[tokio::test]
async fn test_each_severity_publishes_to_its_channel() {
    let h = harness(AlertConfig::default());
    let channels = ChannelMap::default();

    for severity in Severity::ALL {
        h.router.handle(&event(severity.as_str())).await.unwrap();
    }

    for severity in Severity::ALL {
        let messages = h.publisher.messages_for(channels.channel(severity)).await;
        assert_eq!(messages.len(), 1, "one publish on {severity}");
        assert_eq!(messages[0].json().unwrap()["log_level"], severity.as_str());
    }
}

#[tokio::test]
async fn test_error_event_example() {
    let h = harness(alert_config());

    let response = h.router.handle(&event("ERROR")).await.unwrap();
    assert_eq!(response.status_code, 200);

    let published = h.publisher.messages().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].channel, "logs.error");
    let payload = published[0].json().unwrap();
    assert_eq!(payload["message"], "disk full");
    assert!(payload.get("timestamp").is_none());

    assert_eq!(h.notifier.count().await, 0);

    let record = response.record().unwrap();
    let stored = h
        .store
        .get(&RecordKey::new(Severity::Error, record.timestamp()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&stored, record);
}

#[tokio::test]
async fn test_extra_fields_are_ignored() {
    let h = harness(AlertConfig::default());
    let mut raw = event("INFO");
    raw["hostname"] = json!("web-3");
    raw["timestamp"] = json!("1999-01-01T00:00:00Z");

    let response = h.router.handle(&raw).await.unwrap();
    let record = response.record().unwrap();
    assert!(record.timestamp().timestamp() > 946_684_800);

    let payload = h.publisher.messages().await[0].json().unwrap();
    assert!(payload.get("hostname").is_none());
}

// ─── Rejections ──────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_severity_has_no_side_effects() {
    let h = harness(alert_config());

    let response = h.router.handle(&event("TRACE")).await.unwrap();
    assert_eq!(response.status_code, 400);
    match &response.body {
        ResponseBody::Rejected { message } => assert!(message.contains("TRACE")),
        other => panic!("expected rejection, got {other:?}"),
    }

    assert_eq!(h.publisher.count().await, 0);
    assert_eq!(h.notifier.count().await, 0);
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_lowercase_severity_is_invalid() {
    let h = harness(AlertConfig::default());
    let response = h.router.handle(&event("critical")).await.unwrap();
    assert_eq!(response.status_code, 400);
    assert_eq!(h.publisher.count().await, 0);
}

#[tokio::test]
async fn test_missing_field_has_no_side_effects() {
    let h = harness(alert_config());
    let raw = json!({
        "log_level": "CRITICAL",
        "message": "db down",
        "details": "primary unreachable",
    });

    let response = h.router.handle(&raw).await.unwrap();
    assert_eq!(response.status_code, 400);
    match &response.body {
        ResponseBody::Rejected { message } => assert!(message.contains("source_application")),
        other => panic!("expected rejection, got {other:?}"),
    }

    assert_eq!(h.publisher.count().await, 0);
    assert_eq!(h.notifier.count().await, 0);
    assert!(h.store.is_empty().await);
}

// ─── Critical alerts ─────────────────────────────────────────────

#[tokio::test]
async fn test_critical_with_alerting_configured() {
    let h = harness(alert_config());

    let response = h.router.handle(&event("CRITICAL")).await.unwrap();
    assert!(response.is_accepted());

    assert_eq!(h.publisher.messages_for("logs.critical").await.len(), 1);
    assert_eq!(h.publisher.count().await, 1);
    assert_eq!(h.notifier.count().await, 1);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_critical_without_recipient() {
    let h = harness(AlertConfig {
        recipient: None,
        endpoint: Some("https://mailer.example.com/send".to_string()),
    });

    let response = h.router.handle(&event("CRITICAL")).await.unwrap();
    assert!(response.is_accepted());

    assert_eq!(h.notifier.count().await, 0);
    assert_eq!(h.publisher.count().await, 1);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_critical_without_endpoint() {
    let h = harness(AlertConfig {
        recipient: Some("oncall@example.com".to_string()),
        endpoint: None,
    });

    h.router.handle(&event("CRITICAL")).await.unwrap();
    assert_eq!(h.notifier.count().await, 0);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_non_critical_never_alerts() {
    let h = harness(alert_config());
    for level in ["INFO", "DEBUG", "WARNING", "ERROR"] {
        h.router.handle(&event(level)).await.unwrap();
    }
    assert_eq!(h.notifier.count().await, 0);
}

// ─── Mapping stability ───────────────────────────────────────────

#[tokio::test]
async fn test_repeated_calls_use_identical_channel() {
    let h = harness(AlertConfig::default());
    for _ in 0..10 {
        h.router.handle(&event("WARNING")).await.unwrap();
    }

    let messages = h.publisher.messages().await;
    assert_eq!(messages.len(), 10);
    assert!(messages.iter().all(|m| m.channel == "logs.warning"));
}

#[tokio::test]
async fn test_custom_channel_map() {
    let publisher = MemoryPublisher::new();
    let channels = ChannelMap {
        critical: "ops.pager".to_string(),
        ..ChannelMap::default()
    };
    let router = SeverityRouter::new(channels, publisher.clone(), MemoryLogStore::new());

    router.handle(&event("CRITICAL")).await.unwrap();
    assert_eq!(publisher.messages_for("ops.pager").await.len(), 1);
}

// ─── Step ordering & downstream failures ─────────────────────────

#[derive(Clone, Default)]
struct CallLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    fn push(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

struct ScriptedPublisher {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl ChannelPublisher for ScriptedPublisher {
    async fn publish(&self, channel: &str, _payload: &[u8]) -> a3s_logroute::Result<PublishAck> {
        self.log.push("publish");
        if self.fail {
            return Err(RouterError::Publish {
                channel: channel.to_string(),
                reason: "no responders".to_string(),
            });
        }
        Ok(PublishAck {
            channel: channel.to_string(),
            sequence: 1,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedNotifier {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn notify(&self, recipient: &str, _subject: &str, _body: &str) -> a3s_logroute::Result<()> {
        self.log.push("notify");
        if self.fail {
            return Err(RouterError::Notify {
                recipient: recipient.to_string(),
                reason: "HTTP 502".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedStore {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl LogStore for ScriptedStore {
    async fn put(&self, record: &LogRecord) -> a3s_logroute::Result<LogRecord> {
        self.log.push("persist");
        if self.fail {
            return Err(RouterError::Persist("table unavailable".to_string()));
        }
        Ok(record.clone())
    }

    async fn get(&self, _key: &RecordKey) -> a3s_logroute::Result<Option<LogRecord>> {
        Ok(None)
    }

    async fn list(
        &self,
        _severity: Option<Severity>,
        _limit: usize,
    ) -> a3s_logroute::Result<Vec<LogRecord>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn scripted_router(log: &CallLog, fail_at: Option<&str>) -> SeverityRouter {
    SeverityRouter::new(
        ChannelMap::default(),
        ScriptedPublisher {
            log: log.clone(),
            fail: fail_at == Some("publish"),
        },
        ScriptedStore {
            log: log.clone(),
            fail: fail_at == Some("persist"),
        },
    )
    .with_notifier(
        &alert_config(),
        ScriptedNotifier {
            log: log.clone(),
            fail: fail_at == Some("notify"),
        },
    )
}

#[tokio::test]
async fn test_critical_steps_run_in_order() {
    let log = CallLog::default();
    let router = scripted_router(&log, None);

    router.handle(&event("CRITICAL")).await.unwrap();
    assert_eq!(log.calls(), vec!["publish", "notify", "persist"]);
}

#[tokio::test]
async fn test_publish_failure_stops_the_call() {
    let log = CallLog::default();
    let router = scripted_router(&log, Some("publish"));

    let err = router.handle(&event("CRITICAL")).await.unwrap_err();
    assert!(matches!(err, RouterError::Publish { ref channel, .. } if channel == "logs.critical"));
    assert_eq!(log.calls(), vec!["publish"]);
}

#[tokio::test]
async fn test_notify_failure_is_fatal_after_publish() {
    let log = CallLog::default();
    let router = scripted_router(&log, Some("notify"));

    let err = router.handle(&event("CRITICAL")).await.unwrap_err();
    assert!(matches!(err, RouterError::Notify { .. }));
    assert_eq!(log.calls(), vec!["publish", "notify"]);
}

#[tokio::test]
async fn test_persist_failure_is_not_rolled_back() {
    let log = CallLog::default();
    let router = scripted_router(&log, Some("persist"));

    let err = router.handle(&event("ERROR")).await.unwrap_err();
    assert!(matches!(err, RouterError::Persist(_)));
    assert!(!err.is_rejection());
    assert_eq!(log.calls(), vec!["publish", "persist"]);
}

// ─── Concurrency ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_handles() {
    let publisher = MemoryPublisher::new();
    let store = MemoryLogStore::new();
    let router = Arc::new(SeverityRouter::new(
        ChannelMap::default(),
        publisher.clone(),
        store.clone(),
    ));

    let mut handles = Vec::new();
    for i in 0..50 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let severity = Severity::ALL[i % Severity::ALL.len()];
            let raw = json!({
                "log_level": severity.as_str(),
                "message": format!("event {i}"),
                "details": format!("event {i}"),
                "source_application": "load-test",
            });
            router.handle(&raw).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_accepted());
    }

    assert_eq!(publisher.count().await, 50);
    for severity in Severity::ALL {
        let messages = publisher
            .messages_for(ChannelMap::default().channel(severity))
            .await;
        assert_eq!(messages.len(), 10);
    }

    assert_eq!(store.len().await, 50);
    for severity in Severity::ALL {
        let records = store.list(Some(severity), 100).await.unwrap();
        assert_eq!(records.len(), 10);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_same_severity_burst_keeps_every_record() {
    let publisher = MemoryPublisher::new();
    let store = MemoryLogStore::new();
    let router = Arc::new(SeverityRouter::new(
        ChannelMap::default(),
        publisher.clone(),
        store.clone(),
    ));

    let mut handles = Vec::new();
    for i in 0..500 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let raw = json!({
                "log_level": "ERROR",
                "message": format!("burst {i}"),
                "details": "burst",
                "source_application": "load-test",
            });
            router.route(&raw).await.unwrap()
        }));
    }

    let mut keys = std::collections::HashSet::new();
    for handle in handles {
        let record = handle.await.unwrap();
        assert!(keys.insert(record.key().encode()));
    }

    assert_eq!(publisher.messages_for("logs.error").await.len(), 500);
    assert_eq!(store.len().await, 500);

    let mut messages: Vec<String> = store
        .list(Some(Severity::Error), 1000)
        .await
        .unwrap()
        .iter()
        .map(|r| r.event().message().to_string())
        .collect();
    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), 500);
}
