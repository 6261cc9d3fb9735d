//! Dispatch pipeline: persisted record in, delivered webhooks out.
//!
//! The pipeline runs filter-first: routing metadata is extracted and the
//! suppress decision taken before any message is rendered or any actor lookup
//! happens. Webhook connectivity tests skip the filter engine entirely and
//! always produce a message for the webhook under test.
//!
//! The record's `version` field selects the parser: present means the current
//! payload shape, absent the legacy shape. Legacy events are canonicalized and
//! rendered by the same builder, so both shapes produce identical messages.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flagwire_events::{EventRecord, FilterData, FilterEngine};

use crate::builder::MessageBuilder;
use crate::delivery::WebhookClient;
use crate::error::SlackResult;
use crate::messages::SlackMessage;

/// A rendered message together with the routing metadata integrations
/// match against.
#[derive(Debug, Clone, PartialEq)]
pub struct SlackDataForEvent {
    /// Tags and projects extracted from the event. Empty for events that
    /// bypass or carry no routing metadata.
    pub filter_data: FilterData,
    /// The message to post, before any per-integration context is appended.
    pub message: SlackMessage,
}

/// A configured Slack webhook destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackIntegration {
    /// Stable integration id, if the deployment assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, appended to delivered messages as a context block.
    pub name: String,
    /// The incoming-webhook URL to post to.
    pub webhook_url: String,
    /// Tags this integration subscribes to. Empty subscribes to all.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Projects this integration subscribes to. Empty subscribes to all.
    #[serde(default)]
    pub projects: Vec<String>,
}

impl SlackIntegration {
    /// Whether an event with `filter_data` is relevant to this integration.
    ///
    /// Each configured dimension must intersect the event's metadata; an
    /// unconfigured dimension matches everything. An event without tags or
    /// projects therefore only reaches unrestricted integrations.
    pub fn matches(&self, filter_data: &FilterData) -> bool {
        let tags_match = self.tags.is_empty()
            || self.tags.iter().any(|tag| filter_data.tags.contains(tag));
        let projects_match = self.projects.is_empty()
            || self
                .projects
                .iter()
                .any(|project| filter_data.projects.contains(project));
        tags_match && projects_match
    }
}

/// Outcome of fanning one event out to a set of integrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryReport {
    /// Integration names that acknowledged delivery.
    pub delivered: Vec<String>,
    /// Integration names where delivery failed. Failures are isolated; one
    /// does not stop the rest of the fan-out.
    pub failed: Vec<String>,
    /// Integrations skipped because the event did not match their routing.
    pub skipped: usize,
}

impl DeliveryReport {
    /// Whether every attempted delivery succeeded.
    pub fn is_fully_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Turn a persisted event record into a deliverable message plus routing
/// metadata.
///
/// Returns `Ok(None)` when the event should not be notified: either the
/// filter engine suppressed it, or its kind renders no message. Parse
/// failures (unknown or malformed kinds) are errors, not silent drops.
pub async fn slack_data_for_event(
    record: &EventRecord,
    builder: &MessageBuilder,
    filter: &dyn FilterEngine,
) -> SlackResult<Option<SlackDataForEvent>> {
    let event = if record.is_current() {
        record.parse_notification()?
    } else {
        record.parse_legacy()?.into_current()
    };

    // Connectivity tests are always "for" the webhook under test; running
    // them through the filter engine could suppress the very signal the
    // operator is waiting on.
    let filter_data = if event.is_webhook_test() {
        FilterData::default()
    } else {
        match filter.filter_data_for_event(&event) {
            Some(filter_data) => filter_data,
            None => {
                debug!(event_id = %record.id, kind = event.kind(), "event suppressed by filter");
                return Ok(None);
            }
        }
    };

    let message = match builder.build(&event, &record.id).await {
        Some(message) => message,
        None => return Ok(None),
    };

    Ok(Some(SlackDataForEvent {
        filter_data,
        message,
    }))
}

/// Fan one event out to every matching integration.
///
/// Each delivery is independent: a failed or refused post is recorded in the
/// report and the fan-out continues. The report is the complete outcome;
/// this function only fails on parse errors.
pub async fn deliver_to_integrations(
    record: &EventRecord,
    builder: &MessageBuilder,
    filter: &dyn FilterEngine,
    client: &WebhookClient,
    integrations: &[SlackIntegration],
) -> SlackResult<DeliveryReport> {
    let Some(data) = slack_data_for_event(record, builder, filter).await? else {
        return Ok(DeliveryReport::default());
    };

    let mut report = DeliveryReport::default();
    for integration in integrations {
        if !integration.matches(&data.filter_data) {
            report.skipped += 1;
            continue;
        }

        let message = contextualized(&data.message, integration);
        if client.send_message(&message, &integration.webhook_url).await {
            report.delivered.push(integration.name.clone());
        } else {
            report.failed.push(integration.name.clone());
        }
    }

    info!(
        event_id = %record.id,
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "event fan-out finished"
    );
    Ok(report)
}

fn contextualized(message: &SlackMessage, integration: &SlackIntegration) -> SlackMessage {
    message.clone().with_integration_context(&integration.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter_data(tags: &[&str], projects: &[&str]) -> FilterData {
        FilterData {
            tags: tags.iter().map(ToString::to_string).collect(),
            projects: projects.iter().map(ToString::to_string).collect(),
        }
    }

    fn integration(tags: &[&str], projects: &[&str]) -> SlackIntegration {
        SlackIntegration {
            id: Some("int_1".into()),
            name: "Growth alerts".into(),
            webhook_url: "https://hooks.slack.test/T/B/x".into(),
            tags: tags.iter().map(ToString::to_string).collect(),
            projects: projects.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_unrestricted_integration_matches_everything() {
        let unrestricted = integration(&[], &[]);
        assert!(unrestricted.matches(&FilterData::default()));
        assert!(unrestricted.matches(&filter_data(&["checkout"], &["growth"])));
    }

    #[test]
    fn test_tag_restriction() {
        let restricted = integration(&["checkout"], &[]);
        assert!(restricted.matches(&filter_data(&["checkout", "beta"], &[])));
        assert!(!restricted.matches(&filter_data(&["beta"], &[])));
        // Events with no tags only reach unrestricted integrations.
        assert!(!restricted.matches(&FilterData::default()));
    }

    #[test]
    fn test_both_dimensions_must_match() {
        let restricted = integration(&["checkout"], &["growth"]);
        assert!(restricted.matches(&filter_data(&["checkout"], &["growth"])));
        assert!(!restricted.matches(&filter_data(&["checkout"], &["platform"])));
        assert!(!restricted.matches(&filter_data(&["beta"], &["growth"])));
    }

    #[test]
    fn test_report_fully_delivered() {
        let report = DeliveryReport {
            delivered: vec!["a".into()],
            failed: vec![],
            skipped: 2,
        };
        assert!(report.is_fully_delivered());

        let report = DeliveryReport {
            delivered: vec![],
            failed: vec!["b".into()],
            skipped: 0,
        };
        assert!(!report.is_fully_delivered());
        assert_eq!(report.failed, vec!["b".to_string()]);
    }
}
