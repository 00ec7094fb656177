//! Forwarding client
//!
//! `LogForwarder` ships log events from an application to a router's
//! `POST /logs` endpoint and returns the router's response. `ForwardLayer`
//! does the same for every `tracing` event the application emits.

use crate::error::{Result, RouterError};
use crate::types::{LogRequest, RouteResponse, Severity};
use async_trait::async_trait;
use reqwest::StatusCode;

mod layer;

pub use layer::{severity_for_level, ForwardLayer};

/// Destination for an application's log events
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send one event; `details` defaults to the message
    async fn log(&self, severity: Severity, message: &str, details: Option<&str>) -> Result<RouteResponse>;
}

/// HTTP client for a remote severity router
pub struct LogForwarder {
    client: reqwest::Client,
    url: String,
    source_application: String,
}

impl LogForwarder {
    /// `url` is the router's ingest endpoint (e.g., "http://127.0.0.1:8088/logs")
    pub fn new(url: impl Into<String>, source_application: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            source_application: source_application.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source_application(&self) -> &str {
        &self.source_application
    }

    /// Post a raw request
    ///
    /// 200 and 400 answers are decoded as a [`RouteResponse`]; any other
    /// status is a [`RouterError::Forward`].
    pub async fn send(&self, request: &LogRequest) -> Result<RouteResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| RouterError::Forward(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::Forward(format!(
                "{} returned HTTP {}: {}",
                self.url, status, text
            )));
        }

        response
            .json::<RouteResponse>()
            .await
            .map_err(|e| RouterError::Forward(format!("Invalid response from {}: {}", self.url, e)))
    }
}

#[async_trait]
impl LogSink for LogForwarder {
    async fn log(&self, severity: Severity, message: &str, details: Option<&str>) -> Result<RouteResponse> {
        let request = LogRequest::new(
            severity.as_str(),
            message,
            details.unwrap_or(message),
            self.source_application.as_str(),
        );
        self.send(&request).await
    }
}
