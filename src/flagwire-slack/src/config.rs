//! Configuration for the Slack integration.
//!
//! Everything has a sensible default so the pipeline works out of the box in
//! development; deployments override via environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hard ceiling on a single delivery attempt.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(15_000);

/// How much of a webhook response body is read for diagnostics.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 500;

/// Default dashboard origin used in message links.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

/// Configuration for message building and delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Dashboard origin that "View Feature"/"View Experiment"/"View Event"
    /// links point at. No trailing slash.
    pub app_origin: String,

    /// Per-attempt delivery timeout.
    #[serde(default = "default_timeout_ms", rename = "delivery_timeout_ms")]
    #[serde(serialize_with = "serialize_ms", deserialize_with = "deserialize_ms")]
    pub delivery_timeout: Duration,

    /// Response-body diagnostics cap, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_timeout_ms() -> Duration {
    DEFAULT_DELIVERY_TIMEOUT
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

fn serialize_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

fn deserialize_ms<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let ms = u64::deserialize(d)?;
    Ok(Duration::from_millis(ms))
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl SlackConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables:
    /// - `APP_ORIGIN` - dashboard origin for links
    /// - `SLACK_DELIVERY_TIMEOUT_MS` - per-attempt timeout
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origin) = std::env::var("APP_ORIGIN") {
            config.app_origin = origin.trim_end_matches('/').to_string();
        }

        if let Ok(raw) = std::env::var("SLACK_DELIVERY_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.delivery_timeout = Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "invalid SLACK_DELIVERY_TIMEOUT_MS, keeping default");
                }
            }
        }

        config
    }

    /// Set the dashboard origin.
    pub fn with_app_origin(mut self, origin: impl Into<String>) -> Self {
        self.app_origin = origin.into();
        self
    }

    /// Set the per-attempt delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SlackConfig::default();
        assert_eq!(config.app_origin, "http://localhost:3000");
        assert_eq!(config.delivery_timeout, Duration::from_millis(15_000));
        assert_eq!(config.max_response_bytes, 500);
    }

    #[test]
    fn test_builder_style_overrides() {
        let config = SlackConfig::default()
            .with_app_origin("https://app.example.com")
            .with_delivery_timeout(Duration::from_millis(250));
        assert_eq!(config.app_origin, "https://app.example.com");
        assert_eq!(config.delivery_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = SlackConfig::default().with_app_origin("https://x.test");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SlackConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.app_origin, "https://x.test");
        assert_eq!(parsed.delivery_timeout, config.delivery_timeout);
    }
}
