//! Error types for a3s-logroute

use thiserror::Error;

/// Errors that can occur while routing a log event
#[derive(Debug, Error)]
pub enum RouterError {
    /// Inbound record lacks one of the required fields
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Severity tag outside the fixed enumeration
    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    /// Channel publish failure
    #[error("Failed to publish log event to channel '{channel}': {reason}")]
    Publish {
        channel: String,
        reason: String,
    },

    /// Alert delivery failure
    #[error("Failed to notify '{recipient}': {reason}")]
    Notify {
        recipient: String,
        reason: String,
    },

    /// Durable store failure
    #[error("Failed to persist log record: {0}")]
    Persist(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Stream creation or management error
    #[error("Stream error: {0}")]
    Stream(String),

    /// Forwarding a log event to a remote router failed
    #[error("Forward error: {0}")]
    Forward(String),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

impl RouterError {
    /// True for caller mistakes that are answered with a 400 instead of failing the call
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RouterError::MissingField(_) | RouterError::InvalidSeverity(_)
        )
    }
}

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RouterError>;

impl From<RouterError> for axum::response::Response {
    fn from(err: RouterError) -> Self {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let status = if err.is_rejection() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": err.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
