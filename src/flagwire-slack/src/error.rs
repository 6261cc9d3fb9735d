//! Error types for the Slack integration.
//!
//! Delivery failures never surface here - the webhook client reports a
//! boolean and logs the cause. These errors cover what can go wrong before a
//! message leaves the process: bad configuration, unparseable payloads,
//! serialization.

use thiserror::Error;

use flagwire_events::EventParseError;

/// Errors that can occur while preparing a Slack notification.
#[derive(Error, Debug)]
pub enum SlackError {
    /// Configuration error (missing or invalid config).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted payload could not be parsed into a notification event.
    #[error("Event parse error: {0}")]
    Parse(#[from] EventParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlackError::Timeout(err.to_string())
        } else if err.is_connect() {
            SlackError::Network(format!("Connection failed: {err}"))
        } else {
            SlackError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(err: serde_json::Error) -> Self {
        SlackError::Json(err.to_string())
    }
}

/// Result type for Slack operations.
pub type SlackResult<T> = std::result::Result<T, SlackError>;
