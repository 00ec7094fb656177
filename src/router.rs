//! Severity router
//!
//! `SeverityRouter` takes one inbound log record through validation,
//! channel dispatch, the CRITICAL alert, and persistence, in that order.
//! Each step awaits the previous one; nothing is retried or rolled back.

use crate::config::{AlertConfig, ChannelMap};
use crate::error::Result;
use crate::notify::{HttpNotifier, Notifier};
use crate::provider::ChannelPublisher;
use crate::store::LogStore;
use crate::types::{LogEvent, LogRecord, LogRequest, RouteResponse, Severity};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

struct CriticalAlert {
    recipient: String,
    notifier: Box<dyn Notifier>,
}

/// Routes log events to per-severity channels
///
/// Apart from the processing clock, all state is read-only, so one instance
/// can serve concurrent requests behind an `Arc`.
pub struct SeverityRouter {
    channels: ChannelMap,
    publisher: Box<dyn ChannelPublisher>,
    store: Box<dyn LogStore>,
    alert: Option<CriticalAlert>,
    /// Last assigned processing time, in microseconds since the epoch
    last_stamp: AtomicI64,
}

impl SeverityRouter {
    /// Create a router without critical alerting
    pub fn new(
        channels: ChannelMap,
        publisher: impl ChannelPublisher + 'static,
        store: impl LogStore + 'static,
    ) -> Self {
        Self::from_boxed(channels, Box::new(publisher), Box::new(store))
    }

    /// Create a router from backends chosen at runtime
    pub fn from_boxed(
        channels: ChannelMap,
        publisher: Box<dyn ChannelPublisher>,
        store: Box<dyn LogStore>,
    ) -> Self {
        Self {
            channels,
            publisher,
            store,
            alert: None,
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Enable critical alerts delivered over HTTP to the configured endpoint
    ///
    /// Has no effect unless `alert` carries both a recipient and an endpoint.
    pub fn with_alerts(self, alert: &AlertConfig) -> Self {
        let Some((_, endpoint)) = alert.target() else {
            tracing::info!("Critical alerts disabled: recipient or endpoint not configured");
            return self;
        };
        let notifier = HttpNotifier::new(endpoint);
        self.with_notifier(alert, notifier)
    }

    /// Enable critical alerts through a custom `notifier`
    ///
    /// Has no effect unless `alert` carries both a recipient and an endpoint.
    /// The endpoint only gates alerting here; `notifier` decides where alerts
    /// go. Use [`with_alerts`](Self::with_alerts) to deliver to the endpoint.
    pub fn with_notifier(mut self, alert: &AlertConfig, notifier: impl Notifier + 'static) -> Self {
        match alert.target() {
            Some((recipient, endpoint)) => {
                tracing::info!(
                    recipient,
                    endpoint,
                    notifier = notifier.name(),
                    "Critical alerts enabled"
                );
                self.alert = Some(CriticalAlert {
                    recipient: recipient.to_string(),
                    notifier: Box::new(notifier),
                });
            }
            None => {
                tracing::info!("Critical alerts disabled: recipient or endpoint not configured");
            }
        }
        self
    }

    /// Handle one inbound record
    ///
    /// Missing fields and unknown severities come back as a 400 response with
    /// no side effects. Publish, alert, and persistence failures are returned
    /// as `Err`; steps that already ran are not undone.
    pub async fn handle(&self, raw: &serde_json::Value) -> Result<RouteResponse> {
        match self.route(raw).await {
            Ok(record) => Ok(RouteResponse::accepted(record)),
            Err(e) if e.is_rejection() => {
                tracing::warn!(error = %e, "Log event rejected");
                Ok(RouteResponse::rejected(e.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Log event routing failed");
                Err(e)
            }
        }
    }

    /// Route one inbound record, returning the stored record
    pub async fn route(&self, raw: &serde_json::Value) -> Result<LogRecord> {
        let event = LogRequest::from_value(raw)?.into_event()?;
        self.dispatch(event).await
    }

    /// Route an already-validated event
    pub async fn dispatch(&self, event: LogEvent) -> Result<LogRecord> {
        let channel = self.channels.channel(event.severity());
        let payload = serde_json::to_vec(&event)?;

        let ack = self.publisher.publish(channel, &payload).await?;
        tracing::debug!(
            severity = %event.severity(),
            channel,
            sequence = ack.sequence,
            source = %event.source_application(),
            "Log event dispatched"
        );

        if event.severity() == Severity::Critical {
            self.send_critical_alert(&event).await?;
        }

        let record = LogRecord::new(event, self.next_timestamp());
        let stored = self.store.put(&record).await?;
        tracing::debug!(key = %stored.key(), store = self.store.name(), "Log record persisted");

        Ok(stored)
    }

    /// Wall-clock processing time, bumped past the previous stamp when the
    /// clock has not advanced a full microsecond. Keys from one router never
    /// collide within a severity.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let mut last = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_stamp
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(current) => last = current,
            }
        }
    }

    async fn send_critical_alert(&self, event: &LogEvent) -> Result<()> {
        let Some(alert) = &self.alert else {
            return Ok(());
        };

        let subject = alert_subject(event);
        let body = serde_json::to_string(event)?;
        alert
            .notifier
            .notify(&alert.recipient, &subject, &body)
            .await
    }

    /// Channel id a severity routes to
    pub fn channel_for(&self, severity: Severity) -> &str {
        self.channels.channel(severity)
    }

    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// True when CRITICAL events trigger an alert
    pub fn alerts_enabled(&self) -> bool {
        self.alert.is_some()
    }

    pub fn publisher(&self) -> &dyn ChannelPublisher {
        self.publisher.as_ref()
    }

    pub fn store(&self) -> &dyn LogStore {
        self.store.as_ref()
    }
}

/// Subject line of a critical alert
pub fn alert_subject(event: &LogEvent) -> String {
    format!("CRITICAL ERROR @ {}", event.source_application())
}
