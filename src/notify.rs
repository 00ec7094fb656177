//! Critical alert delivery
//!
//! The router calls a `Notifier` once per CRITICAL event when an alert
//! recipient and endpoint are both configured.

use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Synchronous side channel for the most severe tier
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;

    /// Notifier name (e.g., "http", "memory")
    fn name(&self) -> &str;
}

/// Alert payload as sent to the delivery endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Posts alerts as JSON to an HTTP delivery endpoint
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let alert = Alert {
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&alert)
            .send()
            .await
            .map_err(|e| RouterError::Notify {
                recipient: recipient.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::Notify {
                recipient: recipient.to_string(),
                reason: format!("{} returned HTTP {}", self.endpoint, status),
            });
        }

        tracing::info!(recipient, endpoint = %self.endpoint, "Critical alert sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Records alerts instead of delivering them
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.alerts.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.alerts.read().await.len()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.alerts.write().await.push(Alert {
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::new();
        let observer = notifier.clone();

        notifier
            .notify("oncall@example.com", "CRITICAL ERROR @ billing", "{}")
            .await
            .unwrap();

        let alerts = observer.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].to, "oncall@example.com");
        assert_eq!(alerts[0].subject, "CRITICAL ERROR @ billing");
    }

    #[test]
    fn test_alert_wire_shape() {
        let alert = Alert {
            to: "oncall@example.com".into(),
            subject: "s".into(),
            body: "b".into(),
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value, serde_json::json!({"to": "oncall@example.com", "subject": "s", "body": "b"}));
    }

    #[tokio::test]
    async fn test_http_notifier_unreachable_endpoint() {
        // Port 9 (discard) on loopback is closed in test environments
        let notifier = HttpNotifier::new("http://127.0.0.1:9/send");
        let err = notifier
            .notify("oncall@example.com", "s", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Notify { recipient, .. } if recipient == "oncall@example.com"));
    }
}
