//! Block Kit message types.
//!
//! A [`SlackMessage`] always carries both a plain-text fallback and rich
//! blocks describing the same fact; webhook endpoints receive it serialized
//! as `{ "text": ..., "blocks": [...] }`.

use serde::{Deserialize, Serialize};

/// Block Kit block types the integration emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackBlock {
    /// Section block (main content).
    Section {
        /// The section's text, normally mrkdwn.
        text: SlackTextObject,
    },
    /// Context block (small text/images).
    Context {
        /// Elements rendered inline at reduced size.
        elements: Vec<SlackContextElement>,
    },
    /// Image block.
    Image {
        /// Publicly reachable image URL.
        image_url: String,
        /// Alt text for accessibility.
        alt_text: String,
    },
}

impl SlackBlock {
    /// A section block with mrkdwn text.
    pub fn section(text: impl Into<String>) -> Self {
        SlackBlock::Section {
            text: SlackTextObject::mrkdwn(text),
        }
    }
}

/// Slack text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackTextObject {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
}

impl SlackTextObject {
    /// Create a plain text object.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text".to_string(),
            text: text.into(),
        }
    }

    /// Create a mrkdwn text object.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn".to_string(),
            text: text.into(),
        }
    }
}

/// Elements allowed inside a context block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackContextElement {
    /// Plain text.
    PlainText { text: String },
    /// Mrkdwn text.
    Mrkdwn { text: String },
    /// Image.
    Image { image_url: String, alt_text: String },
}

/// A channel-agnostic notification message: plain-text fallback plus blocks.
///
/// Invariant: `text` summarizes exactly what `blocks` renders richly. The
/// builder enforces this by deriving both from the same sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    /// Plain-text fallback shown in notifications and unfurl previews.
    pub text: String,
    /// Rich Block Kit rendering of the same fact.
    pub blocks: Vec<SlackBlock>,
}

impl SlackMessage {
    /// Build a message whose blocks are a single mrkdwn section.
    pub fn sectioned(text: impl Into<String>, rich_text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: vec![SlackBlock::section(rich_text)],
        }
    }

    /// Append the per-integration context block before delivery.
    pub fn with_integration_context(mut self, integration_name: &str) -> Self {
        self.blocks.push(integration_context_block(integration_name));
        self
    }
}

/// Flagwire context appended to every delivered message: the product mark
/// plus which integration the message came from.
pub fn integration_context_block(integration_name: &str) -> SlackBlock {
    SlackBlock::Context {
        elements: vec![
            SlackContextElement::Image {
                image_url: "https://cdn.flagwire.dev/logo/logo-mark.png".to_string(),
                alt_text: "Flagwire logo".to_string(),
            },
            SlackContextElement::PlainText {
                text: format!("This was sent from your Slack integration: {integration_name}"),
            },
        ],
    }
}
