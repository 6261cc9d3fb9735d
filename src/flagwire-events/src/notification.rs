//! The current, versioned notification event shape.
//!
//! Events are adjacently tagged on the wire: the `event` field carries the
//! kind (`feature.created`, `experiment.warning`, ...) and `data` carries an
//! `object` payload specific to that kind:
//!
//! ```json
//! { "event": "feature.updated", "data": { "object": { "id": "my-flag" } } }
//! ```
//!
//! The union is closed: adding a kind here forces every `match` over
//! [`NotificationEvent`] to be updated at compile time. Unknown kinds can only
//! arrive from deserialized payloads and are rejected by the runtime guard in
//! [`crate::record`].

use serde::{Deserialize, Serialize};

/// All notification event kinds, in their current wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum NotificationEvent {
    /// A user logged into the dashboard. Intentionally unnotified.
    #[serde(rename = "user.login")]
    UserLogin {
        /// The user who logged in.
        object: UserObject,
    },

    /// A feature flag was created.
    #[serde(rename = "feature.created")]
    FeatureCreated {
        /// The created feature.
        object: FeatureObject,
    },

    /// A feature flag was updated.
    #[serde(rename = "feature.updated")]
    FeatureUpdated {
        /// The feature after the update.
        object: FeatureObject,
    },

    /// A feature flag was deleted.
    #[serde(rename = "feature.deleted")]
    FeatureDeleted {
        /// The feature as it was before deletion.
        object: FeatureObject,
    },

    /// An experiment was created.
    #[serde(rename = "experiment.created")]
    ExperimentCreated {
        /// The created experiment.
        object: ExperimentObject,
    },

    /// An experiment was updated.
    #[serde(rename = "experiment.updated")]
    ExperimentUpdated {
        /// The experiment after the update.
        object: ExperimentObject,
    },

    /// An experiment was deleted.
    #[serde(rename = "experiment.deleted")]
    ExperimentDeleted {
        /// The experiment as it was before deletion.
        object: ExperimentObject,
    },

    /// A health warning was raised for a running experiment.
    #[serde(rename = "experiment.warning")]
    ExperimentWarning {
        /// The warning details, sub-tagged by warning kind.
        object: ExperimentWarning,
    },

    /// One or more (variation, metric) pairs crossed a significance boundary.
    #[serde(rename = "experiment.info.significance")]
    ExperimentInfoSignificance {
        /// Per-(variation, metric) significance records, in emission order.
        /// All records share one experiment id/name/stats engine.
        object: Vec<SignificanceRecord>,
    },

    /// Connectivity test fired by an operator against a configured webhook.
    #[serde(rename = "webhook.test")]
    WebhookTest {
        /// Identifies the webhook under test.
        object: WebhookTestObject,
    },
}

/// Event kinds the pipeline understands, as wire strings.
///
/// Used by the runtime parse guard; must stay in sync with the enum above.
pub const KNOWN_EVENT_KINDS: &[&str] = &[
    "user.login",
    "feature.created",
    "feature.updated",
    "feature.deleted",
    "experiment.created",
    "experiment.updated",
    "experiment.deleted",
    "experiment.warning",
    "experiment.info.significance",
    "webhook.test",
];

impl NotificationEvent {
    /// The wire string for this event's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::UserLogin { .. } => "user.login",
            NotificationEvent::FeatureCreated { .. } => "feature.created",
            NotificationEvent::FeatureUpdated { .. } => "feature.updated",
            NotificationEvent::FeatureDeleted { .. } => "feature.deleted",
            NotificationEvent::ExperimentCreated { .. } => "experiment.created",
            NotificationEvent::ExperimentUpdated { .. } => "experiment.updated",
            NotificationEvent::ExperimentDeleted { .. } => "experiment.deleted",
            NotificationEvent::ExperimentWarning { .. } => "experiment.warning",
            NotificationEvent::ExperimentInfoSignificance { .. } => "experiment.info.significance",
            NotificationEvent::WebhookTest { .. } => "webhook.test",
        }
    }

    /// Whether this is a webhook connectivity test.
    ///
    /// Test events bypass notification filtering entirely: they are always
    /// considered "for" the webhook under test.
    pub fn is_webhook_test(&self) -> bool {
        matches!(self, NotificationEvent::WebhookTest { .. })
    }
}

/// A dashboard user, as carried by `user.login` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserObject {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
}

/// A feature flag, reduced to the fields notifications care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureObject {
    /// Feature key. Doubles as the display name in messages.
    pub id: String,
    /// Owning project, if the feature is scoped to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Tags used for integration routing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// An experiment, reduced to the fields notifications care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentObject {
    /// Experiment id, used for links.
    pub id: String,
    /// Human-readable experiment name, used in message text.
    pub name: String,
    /// Owning project, if the experiment is scoped to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Tags used for integration routing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Identifies the webhook an operator is testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTestObject {
    /// Id of the webhook under test.
    pub webhook_id: String,
}

/// Experiment health warnings, sub-tagged by warning kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExperimentWarning {
    /// Scheduled snapshot refresh finished (successfully or not).
    #[serde(rename_all = "camelCase")]
    AutoUpdate {
        /// Experiment id, used for links.
        experiment_id: String,
        /// Experiment name, used in message text.
        experiment_name: String,
        /// Whether the automatic snapshot succeeded.
        success: bool,
    },

    /// Users saw more than one variation and were dropped from results.
    #[serde(rename_all = "camelCase")]
    MultipleExposures {
        /// Experiment id, used for links.
        experiment_id: String,
        /// Experiment name, used in message text.
        experiment_name: String,
        /// How many users were exposed to multiple variations.
        users_count: u64,
        /// Fraction of all users affected, in `[0, 1]`.
        percent: f64,
    },

    /// Sample Ratio Mismatch: observed traffic split deviates from the
    /// configured split beyond the p-value threshold.
    #[serde(rename_all = "camelCase")]
    Srm {
        /// Experiment id, used for links.
        experiment_id: String,
        /// Experiment name, used in message text.
        experiment_name: String,
        /// The configured SRM p-value threshold that was breached.
        threshold: f64,
    },
}

/// Warning sub-types the pipeline understands, as wire strings.
pub const KNOWN_WARNING_KINDS: &[&str] = &["auto-update", "multiple-exposures", "srm"];

impl ExperimentWarning {
    /// Experiment id this warning refers to.
    pub fn experiment_id(&self) -> &str {
        match self {
            ExperimentWarning::AutoUpdate { experiment_id, .. }
            | ExperimentWarning::MultipleExposures { experiment_id, .. }
            | ExperimentWarning::Srm { experiment_id, .. } => experiment_id,
        }
    }

    /// Experiment name this warning refers to.
    pub fn experiment_name(&self) -> &str {
        match self {
            ExperimentWarning::AutoUpdate {
                experiment_name, ..
            }
            | ExperimentWarning::MultipleExposures {
                experiment_name, ..
            }
            | ExperimentWarning::Srm {
                experiment_name, ..
            } => experiment_name,
        }
    }
}

/// Statistical methodology used to compute significance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsEngine {
    /// Null-hypothesis testing; significance is expressed as a p-value.
    Frequentist,
    /// Posterior probability; significance is a chance-to-beat-baseline.
    Bayesian,
}

/// One (variation, metric) significance fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificanceRecord {
    /// Experiment id; identical across one payload.
    pub experiment_id: String,
    /// Experiment name; identical across one payload.
    pub experiment_name: String,
    /// Variation id within the experiment.
    pub variation_id: String,
    /// Variation display name; grouping key for rendering.
    pub variation_name: String,
    /// Metric id.
    pub metric_id: String,
    /// Metric display name.
    pub metric_name: String,
    /// Stats engine that produced `critical_value`; identical across one
    /// payload.
    pub stats_engine: StatsEngine,
    /// Frequentist: the p-value. Bayesian: chance to beat baseline in
    /// `[0, 1]`.
    pub critical_value: f64,
    /// Whether the variation is beating the baseline on this metric.
    pub winning: bool,
}
