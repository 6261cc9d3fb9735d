//! Event-to-message rendering.
//!
//! [`MessageBuilder`] is the only place notification kinds are dispatched.
//! The `match` is exhaustive over the closed [`NotificationEvent`] union, so
//! adding a kind to the domain model fails compilation here instead of
//! silently dropping notifications. Unknown kinds arriving off the wire never
//! reach this module - the parse guard in `flagwire-events` rejects them.
//!
//! Legacy-shape events are canonicalized first and rendered by the same code,
//! which is what keeps the two shapes byte-identical in output.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use flagwire_events::notification::StatsEngine;
use flagwire_events::{
    EventStore, EventUser, ExperimentWarning, LegacyNotificationEvent, NotificationEvent,
    SignificanceRecord,
};

use crate::format::{format_count, format_p_value, format_percent};
use crate::messages::SlackMessage;

/// Attribution used when the acting user cannot be resolved.
const UNKNOWN_USER: &str = "an unknown user";

/// Renders notification events into Slack messages.
pub struct MessageBuilder {
    origin: String,
    store: Arc<dyn EventStore>,
}

impl MessageBuilder {
    /// Create a builder. `origin` is the dashboard origin links point at,
    /// without a trailing slash.
    pub fn new(origin: impl Into<String>, store: Arc<dyn EventStore>) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self { origin, store }
    }

    /// Render a current-shape event. Returns `None` for kinds that are
    /// intentionally unnotified (`user.login`).
    ///
    /// Feature events look up the acting user through the event store; that
    /// lookup is best-effort and degrades to "an unknown user" rather than
    /// failing the message.
    pub async fn build(&self, event: &NotificationEvent, event_id: &str) -> Option<SlackMessage> {
        match event {
            NotificationEvent::UserLogin { .. } => None,

            NotificationEvent::FeatureCreated { object } => {
                Some(self.feature_message(&object.id, event_id, "created").await)
            }
            NotificationEvent::FeatureUpdated { object } => {
                Some(self.feature_message(&object.id, event_id, "updated").await)
            }
            NotificationEvent::FeatureDeleted { object } => {
                Some(self.feature_deleted_message(&object.id, event_id).await)
            }

            NotificationEvent::ExperimentCreated { object } => {
                Some(self.experiment_message(&object.id, &object.name, event_id, "created"))
            }
            NotificationEvent::ExperimentUpdated { object } => {
                Some(self.experiment_message(&object.id, &object.name, event_id, "updated"))
            }
            NotificationEvent::ExperimentDeleted { object } => {
                Some(self.experiment_deleted_message(&object.name, event_id))
            }

            NotificationEvent::ExperimentWarning { object } => {
                Some(self.warning_message(object))
            }
            NotificationEvent::ExperimentInfoSignificance { object } => {
                self.significance_message(object)
            }

            NotificationEvent::WebhookTest { object } => {
                Some(webhook_test_message(&object.webhook_id))
            }
        }
    }

    /// Render a legacy-shape event by canonicalizing it first.
    pub async fn build_legacy(
        &self,
        event: LegacyNotificationEvent,
        event_id: &str,
    ) -> Option<SlackMessage> {
        self.build(&event.into_current(), event_id).await
    }

    /// Resolve the acting user for an event into display text.
    async fn event_user_formatted(&self, event_id: &str) -> String {
        let record = match self.store.get_event(event_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return UNKNOWN_USER.to_string(),
            Err(err) => {
                warn!(%event_id, %err, "event lookup failed, degrading attribution");
                return UNKNOWN_USER.to_string();
            }
        };

        match record.user() {
            Some(EventUser::ApiKey { api_key }) => {
                format!(
                    "an API request with key ending in ...{}",
                    key_suffix(&api_key)
                )
            }
            Some(EventUser::Dashboard { name, email }) => format!("{name} ({email})"),
            None => UNKNOWN_USER.to_string(),
        }
    }

    fn feature_url(&self, feature_id: &str) -> String {
        format!("\n• <{}/features/{}|View Feature>", self.origin, feature_id)
    }

    fn experiment_url(&self, experiment_id: &str) -> String {
        format!(
            "\n• <{}/experiment/{}|View Experiment>",
            self.origin, experiment_id
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("\n• <{}/events/{}|View Event>", self.origin, event_id)
    }

    fn experiment_link(&self, experiment_id: &str, experiment_name: &str) -> String {
        format!(
            "<{}/experiment/{}|{}>",
            self.origin, experiment_id, experiment_name
        )
    }

    async fn feature_message(&self, feature_id: &str, event_id: &str, verb: &str) -> SlackMessage {
        let user = self.event_user_formatted(event_id).await;
        SlackMessage::sectioned(
            format!("The feature {feature_id} has been {verb} by {user}"),
            format!(
                "The feature *{feature_id}* has been {verb} by {user}.{}{}",
                self.feature_url(feature_id),
                self.event_url(event_id)
            ),
        )
    }

    async fn feature_deleted_message(&self, feature_id: &str, event_id: &str) -> SlackMessage {
        let user = self.event_user_formatted(event_id).await;
        // No feature link: the record no longer exists.
        SlackMessage::sectioned(
            format!("The feature {feature_id} has been deleted by {user}"),
            format!(
                "The feature *{feature_id}* has been deleted by {user}.{}",
                self.event_url(event_id)
            ),
        )
    }

    fn experiment_message(
        &self,
        experiment_id: &str,
        experiment_name: &str,
        event_id: &str,
        verb: &str,
    ) -> SlackMessage {
        SlackMessage::sectioned(
            format!("The experiment {experiment_name} has been {verb}"),
            format!(
                "The experiment *{experiment_name}* has been {verb}.{}{}",
                self.experiment_url(experiment_id),
                self.event_url(event_id)
            ),
        )
    }

    fn experiment_deleted_message(&self, experiment_name: &str, event_id: &str) -> SlackMessage {
        // No experiment link: the record no longer exists.
        SlackMessage::sectioned(
            format!("The experiment {experiment_name} has been deleted"),
            format!(
                "The experiment *{experiment_name}* has been deleted.{}",
                self.event_url(event_id)
            ),
        )
    }

    fn warning_message(&self, warning: &ExperimentWarning) -> SlackMessage {
        match warning {
            ExperimentWarning::AutoUpdate {
                experiment_id,
                experiment_name,
                success,
            } => {
                let outcome = if *success { "succeeded" } else { "failed" };
                let sentence =
                    |name: &str| format!("Automatic snapshot creation for {name} {outcome}!");
                SlackMessage::sectioned(
                    sentence(experiment_name),
                    format!(
                        "{}{}",
                        sentence(&format!("*{experiment_name}*")),
                        self.experiment_url(experiment_id)
                    ),
                )
            }

            ExperimentWarning::MultipleExposures {
                experiment_id,
                experiment_name,
                users_count,
                percent,
            } => {
                let sentence = |name: &str| {
                    format!(
                        "Multiple Exposures Warning for experiment {name}: {} users ({}) saw multiple variations and were automatically removed from results.",
                        format_count(*users_count),
                        format_percent(*percent)
                    )
                };
                SlackMessage::sectioned(
                    sentence(experiment_name),
                    format!(
                        "{}{}",
                        sentence(&format!("*{experiment_name}*")),
                        self.experiment_url(experiment_id)
                    ),
                )
            }

            ExperimentWarning::Srm {
                experiment_id,
                experiment_name,
                threshold,
            } => {
                let sentence = |name: &str| {
                    format!(
                        "Traffic imbalance detected for experiment {name}: Sample Ratio Mismatch (SRM) p-value below {threshold}."
                    )
                };
                SlackMessage::sectioned(
                    sentence(experiment_name),
                    format!(
                        "{}{}",
                        sentence(&format!("*{experiment_name}*")),
                        self.experiment_url(experiment_id)
                    ),
                )
            }
        }
    }

    fn significance_message(&self, records: &[SignificanceRecord]) -> Option<SlackMessage> {
        let first = match records.first() {
            Some(first) => first,
            None => {
                warn!("significance payload with no records, nothing to render");
                return None;
            }
        };

        // Single-pass fold into per-variation buckets, preserving first-seen
        // order of variations and, within one, first-seen order of metrics.
        let mut variations: IndexMap<&str, Vec<&SignificanceRecord>> = IndexMap::new();
        for record in records {
            variations
                .entry(record.variation_name.as_str())
                .or_default()
                .push(record);
        }

        let text = significance_text(&first.experiment_name, first.stats_engine, &variations);
        let rich = significance_text(
            &self.experiment_link(&first.experiment_id, &first.experiment_name),
            first.stats_engine,
            &variations,
        );

        Some(SlackMessage::sectioned(text, rich))
    }
}

/// Render the grouped significance facts. `experiment_display` is the plain
/// name for fallback text or a mrkdwn link for the rich block.
fn significance_text(
    experiment_display: &str,
    stats_engine: StatsEngine,
    variations: &IndexMap<&str, Vec<&SignificanceRecord>>,
) -> String {
    variations
        .iter()
        .map(|(variation_name, metrics)| {
            let lines: String = metrics
                .iter()
                .map(|record| match stats_engine {
                    StatsEngine::Frequentist => {
                        let direction = if record.winning {
                            "*beating*"
                        } else {
                            "*losing to*"
                        };
                        format!(
                            "\n- *{}* is {direction} the baseline and has reached statistical significance (p-value = {}).",
                            record.metric_name,
                            format_p_value(record.critical_value)
                        )
                    }
                    StatsEngine::Bayesian => {
                        let direction = if record.winning {
                            "reached a"
                        } else {
                            "dropped to a"
                        };
                        format!(
                            "\n- *{}* has {direction} {} chance to beat the baseline.",
                            record.metric_name,
                            format_percent(record.critical_value)
                        )
                    }
                })
                .collect();
            format!("In experiment {experiment_display} for variation *{variation_name}*: {lines}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The static connectivity-test message.
pub fn webhook_test_message(webhook_id: &str) -> SlackMessage {
    SlackMessage::sectioned(
        format!("This is a test event for webhook {webhook_id}"),
        format!("This is a *test event* for {webhook_id}"),
    )
}

/// Last four characters of an API key, char-boundary safe.
fn key_suffix(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}
