//! Slack integration for Flagwire.
//!
//! This crate turns domain notification events into Slack Block Kit messages
//! and delivers them to configured webhook integrations:
//!
//! - `messages` - Block Kit types and the `SlackMessage` envelope
//! - `builder` - event-to-message rendering (the only place event kinds are
//!   dispatched; the match is exhaustive over the closed union)
//! - `format` - stateless numeric formatters shared by the renderers
//! - `delivery` - one best-effort HTTP POST per call, boolean outcome
//! - `dispatch` - filter decision, shape selection and integration fan-out
//!
//! # Example
//!
//! ```rust,ignore
//! use flagwire_slack::{MessageBuilder, SlackConfig, WebhookClient};
//!
//! let config = SlackConfig::from_env();
//! let builder = MessageBuilder::new(config.app_origin.clone(), store);
//! if let Some(message) = builder.build(&event, "event-id").await {
//!     let delivered = WebhookClient::new(&config).send_message(&message, url).await;
//! }
//! ```
//!
//! Delivery is at-most-once: no retry, no backoff, no queue. If at-least-once
//! semantics are needed they belong to a durable layer above this crate.

pub mod builder;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod messages;

// Re-export main types
pub use builder::MessageBuilder;
pub use config::SlackConfig;
pub use delivery::WebhookClient;
pub use dispatch::{
    DeliveryReport, SlackDataForEvent, SlackIntegration, deliver_to_integrations,
    slack_data_for_event,
};
pub use error::{SlackError, SlackResult};
pub use messages::{SlackBlock, SlackMessage};
