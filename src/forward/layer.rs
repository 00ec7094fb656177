//! `tracing` layer that forwards application events to a severity router
//!
//! Each event becomes a `LogRequest`:
//!
//! | Request field        | Taken from                                         |
//! |----------------------|----------------------------------------------------|
//! | `log_level`          | a `severity` field if it names a severity, else the event level |
//! | `message`            | the event message                                  |
//! | `details`            | `Line <line>: <message>`                           |
//! | `source_application` | a `source_application` field, else the module path |
//!
//! Events are queued to a background task that posts them through a
//! [`LogForwarder`], so emitting an event never waits on the network.

use super::LogForwarder;
use crate::types::{LogRequest, Severity};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets whose events are never forwarded: this crate and the HTTP stack
/// the forwarder posts through
const EXCLUDED_TARGETS: &[&str] = &[
    "a3s_logroute",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "tower",
    "tower_http",
    "axum",
];

/// Map a `tracing` level onto the routing severity
///
/// `tracing` has no level above ERROR; CRITICAL is reached through a
/// `severity = "CRITICAL"` event field.
pub fn severity_for_level(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warning,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

/// Forwards `tracing` events to a remote router
pub struct ForwardLayer {
    sender: mpsc::UnboundedSender<LogRequest>,
    excluded: Vec<String>,
}

impl ForwardLayer {
    /// Create the layer and spawn the task that posts its events
    ///
    /// Must be called inside a tokio runtime. The task exits once the layer
    /// (and with it the subscriber) is dropped and the queue is drained.
    pub fn spawn(forwarder: LogForwarder) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<LogRequest>();
        let task = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                if let Err(e) = forwarder.send(&request).await {
                    tracing::debug!(error = %e, "Failed to forward log event");
                }
            }
        });
        (Self::with_sender(sender), task)
    }

    fn with_sender(sender: mpsc::UnboundedSender<LogRequest>) -> Self {
        Self {
            sender,
            excluded: EXCLUDED_TARGETS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Also skip events whose target is `target` or one of its submodules
    pub fn exclude_target(mut self, target: impl Into<String>) -> Self {
        self.excluded.push(target.into());
        self
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded.iter().any(|prefix| {
            target
                .strip_prefix(prefix.as_str())
                .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

#[derive(Default)]
struct EventFields {
    message: Option<String>,
    severity: Option<Severity>,
    source_application: Option<String>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "severity" => self.severity = value.parse().ok(),
            "source_application" => self.source_application = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for ForwardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if self.is_excluded(metadata.target()) {
            return;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);
        let Some(message) = fields.message else {
            return;
        };

        let severity = fields
            .severity
            .unwrap_or_else(|| severity_for_level(metadata.level()));
        let details = match metadata.line() {
            Some(line) => format!("Line {}: {}", line, message),
            None => message.clone(),
        };
        let source_application = fields.source_application.unwrap_or_else(|| {
            metadata
                .module_path()
                .unwrap_or_else(|| metadata.target())
                .to_string()
        });

        // A closed queue means the forwarding task is gone; drop the event
        let _ = self.sender.send(LogRequest::new(
            severity.as_str(),
            message,
            details,
            source_application,
        ));
    }
}
