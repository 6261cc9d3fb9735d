//! Webhook delivery.
//!
//! One best-effort HTTP POST per call. Delivery reports a boolean outcome and
//! never raises: a refused connection, a timeout, a non-2xx status or an
//! unreadable body all log and return `false`. At-most-once is the contract;
//! retries belong to a durable layer above this crate.

use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::config::SlackConfig;
use crate::messages::SlackMessage;

/// Posts Slack messages to incoming-webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    delivery_timeout: std::time::Duration,
    max_response_bytes: usize,
}

impl WebhookClient {
    /// Build a client from delivery settings. The timeout covers the whole
    /// request, connect through body.
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            client: Client::new(),
            delivery_timeout: config.delivery_timeout,
            max_response_bytes: config.max_response_bytes,
        }
    }

    /// POST `message` as JSON to `webhook_url`.
    ///
    /// Returns whether Slack acknowledged with a 2xx. Every failure mode is
    /// logged here so callers can treat the boolean as the complete outcome.
    pub async fn send_message(&self, message: &SlackMessage, webhook_url: &str) -> bool {
        let response = self
            .client
            .post(webhook_url)
            .timeout(self.delivery_timeout)
            .json(message)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!(%webhook_url, %err, "webhook delivery failed");
                return false;
            }
        };

        let status = response.status();
        let body = self.read_capped(response).await;

        if status.is_success() {
            debug!(%webhook_url, %status, "webhook delivered");
            true
        } else {
            warn!(%webhook_url, %status, %body, "webhook rejected message");
            false
        }
    }

    /// Read at most `max_response_bytes` of the response body.
    ///
    /// The body is only used for logging; the cap keeps a misbehaving
    /// endpoint from ballooning memory or log volume.
    async fn read_capped(&self, response: reqwest::Response) -> String {
        let mut collected: Vec<u8> = Vec::with_capacity(self.max_response_bytes.min(512));
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    debug!(%err, "stopped reading webhook response body");
                    break;
                }
            };
            let remaining = self.max_response_bytes - collected.len();
            collected.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
            if collected.len() >= self.max_response_bytes {
                break;
            }
        }

        String::from_utf8_lossy(&collected).into_owned()
    }
}
