//! Core log event types for the a3s-logroute system
//!
//! Log events use snake_case keys on the wire (`log_level`, `source_application`)
//! so the inbound request and the echoed record share one shape. Response
//! envelopes use camelCase.

use crate::error::{Result, RouterError};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity tag controlling where a log event is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Debug,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Every member of the enumeration
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Debug,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Wire tag (e.g., "WARNING")
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RouterError;

    /// Exact, case-sensitive match against the wire tags
    fn from_str(s: &str) -> Result<Self> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| RouterError::InvalidSeverity(s.to_string()))
    }
}

/// Untyped inbound log record
///
/// Holds the four fields a caller must supply, still as text. Severity is
/// validated later by [`LogRequest::into_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRequest {
    pub log_level: String,
    pub message: String,
    pub details: String,
    pub source_application: String,
}

impl LogRequest {
    /// Create a request from its four fields
    pub fn new(
        log_level: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
        source_application: impl Into<String>,
    ) -> Self {
        Self {
            log_level: log_level.into(),
            message: message.into(),
            details: details.into(),
            source_application: source_application.into(),
        }
    }

    /// Extract the required fields from an arbitrary JSON record
    ///
    /// Keys other than the four required ones are ignored. An absent or
    /// `null` key is a [`RouterError::MissingField`]; non-string scalars are
    /// kept in their JSON text form.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            log_level: required_field(value, "log_level")?,
            message: required_field(value, "message")?,
            details: required_field(value, "details")?,
            source_application: required_field(value, "source_application")?,
        })
    }

    /// Validate the severity tag and build a [`LogEvent`]
    pub fn into_event(self) -> Result<LogEvent> {
        let severity = self.log_level.parse::<Severity>()?;
        Ok(LogEvent {
            severity,
            message: self.message,
            details: self.details,
            source_application: self.source_application,
        })
    }
}

fn required_field(value: &serde_json::Value, field: &str) -> Result<String> {
    match value.get(field) {
        None | Some(serde_json::Value::Null) => Err(RouterError::MissingField(field.to_string())),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

/// A validated log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Routing severity, serialized as `log_level`
    #[serde(rename = "log_level")]
    severity: Severity,

    /// Free-text description
    message: String,

    /// Supplementary context (may repeat the message)
    details: String,

    /// Originating system
    source_application: String,
}

impl LogEvent {
    /// Create a validated event directly from a severity
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        details: impl Into<String>,
        source_application: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            details: details.into(),
            source_application: source_application.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn source_application(&self) -> &str {
        &self.source_application
    }
}

/// A log event stamped with its processing time, as held by the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(flatten)]
    event: LogEvent,

    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Stamp an event; the timestamp is truncated to microseconds to match its key
    pub fn new(event: LogEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            event,
            timestamp: timestamp.trunc_subsecs(6),
        }
    }

    pub fn event(&self) -> &LogEvent {
        &self.event
    }

    pub fn severity(&self) -> Severity {
        self.event.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Store key for this record
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.event.severity, self.timestamp)
    }
}

/// Durable store key: `(severity, timestamp)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl RecordKey {
    pub fn new(severity: Severity, timestamp: DateTime<Utc>) -> Self {
        Self {
            severity,
            timestamp: timestamp.trunc_subsecs(6),
        }
    }

    /// Encoded form `<SEVERITY>#<RFC3339 micros>`, chronological within a severity
    pub fn encode(&self) -> String {
        format!(
            "{}{}",
            Self::prefix(self.severity),
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }

    /// Key prefix shared by all records of one severity
    pub fn prefix(severity: Severity) -> String {
        format!("{}#", severity.as_str())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Body of a [`RouteResponse`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// The stored record, echoed back
    Accepted(LogRecord),

    /// Human-readable reason for a 400
    Rejected { message: String },
}

/// Structured result of handling one log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl RouteResponse {
    pub fn accepted(record: LogRecord) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Accepted(record),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            body: ResponseBody::Rejected {
                message: message.into(),
            },
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status_code == 200
    }

    /// The stored record, if the event was accepted
    pub fn record(&self) -> Option<&LogRecord> {
        match &self.body {
            ResponseBody::Accepted(record) => Some(record),
            ResponseBody::Rejected { .. } => None,
        }
    }
}
