//! The legacy, pre-versioning notification event shape.
//!
//! Older persisted events carry their payload as `current`/`previous`
//! snapshots instead of the versioned `object` wrapper:
//!
//! ```json
//! { "event": "feature.deleted", "data": { "previous": { "id": "my-flag" } } }
//! ```
//!
//! This shape is a migration-compatibility shim, not a second feature: it is
//! converted into the canonical [`NotificationEvent`] via [`into_current`]
//! so a single renderer serves both shapes and their output stays identical.
//!
//! The legacy schema predates significance notifications, so there is no
//! `experiment.info.significance` variant here.
//!
//! [`into_current`]: LegacyNotificationEvent::into_current

use serde::{Deserialize, Serialize};

use crate::notification::{
    ExperimentObject, ExperimentWarning, FeatureObject, NotificationEvent, UserObject,
    WebhookTestObject,
};

/// All notification event kinds, in their legacy wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum LegacyNotificationEvent {
    /// A user logged into the dashboard. Intentionally unnotified.
    #[serde(rename = "user.login")]
    UserLogin {
        /// The user who logged in.
        current: UserObject,
    },

    /// A feature flag was created.
    #[serde(rename = "feature.created")]
    FeatureCreated {
        /// The created feature.
        current: FeatureObject,
    },

    /// A feature flag was updated.
    #[serde(rename = "feature.updated")]
    FeatureUpdated {
        /// The feature after the update.
        current: FeatureObject,
    },

    /// A feature flag was deleted. Only the pre-deletion snapshot exists.
    #[serde(rename = "feature.deleted")]
    FeatureDeleted {
        /// The feature as it was before deletion.
        previous: FeatureObject,
    },

    /// An experiment was created.
    #[serde(rename = "experiment.created")]
    ExperimentCreated {
        /// The created experiment.
        current: ExperimentObject,
    },

    /// An experiment was updated.
    #[serde(rename = "experiment.updated")]
    ExperimentUpdated {
        /// The experiment after the update.
        current: ExperimentObject,
    },

    /// An experiment was deleted. Only the pre-deletion snapshot exists.
    #[serde(rename = "experiment.deleted")]
    ExperimentDeleted {
        /// The experiment as it was before deletion.
        previous: ExperimentObject,
    },

    /// A health warning for a running experiment. Legacy events carry the
    /// warning payload directly as `data`, without the `object` wrapper.
    #[serde(rename = "experiment.warning")]
    ExperimentWarning(ExperimentWarning),

    /// Connectivity test fired by an operator against a configured webhook.
    #[serde(rename = "webhook.test", rename_all = "camelCase")]
    WebhookTest {
        /// Id of the webhook under test.
        webhook_id: String,
    },
}

impl LegacyNotificationEvent {
    /// The wire string for this event's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LegacyNotificationEvent::UserLogin { .. } => "user.login",
            LegacyNotificationEvent::FeatureCreated { .. } => "feature.created",
            LegacyNotificationEvent::FeatureUpdated { .. } => "feature.updated",
            LegacyNotificationEvent::FeatureDeleted { .. } => "feature.deleted",
            LegacyNotificationEvent::ExperimentCreated { .. } => "experiment.created",
            LegacyNotificationEvent::ExperimentUpdated { .. } => "experiment.updated",
            LegacyNotificationEvent::ExperimentDeleted { .. } => "experiment.deleted",
            LegacyNotificationEvent::ExperimentWarning(_) => "experiment.warning",
            LegacyNotificationEvent::WebhookTest { .. } => "webhook.test",
        }
    }

    /// Convert into the canonical current-shape event.
    ///
    /// This is the compatibility seam: rendering only ever sees
    /// [`NotificationEvent`], so equivalent legacy and current payloads
    /// produce byte-identical messages.
    pub fn into_current(self) -> NotificationEvent {
        match self {
            LegacyNotificationEvent::UserLogin { current } => {
                NotificationEvent::UserLogin { object: current }
            }
            LegacyNotificationEvent::FeatureCreated { current } => {
                NotificationEvent::FeatureCreated { object: current }
            }
            LegacyNotificationEvent::FeatureUpdated { current } => {
                NotificationEvent::FeatureUpdated { object: current }
            }
            LegacyNotificationEvent::FeatureDeleted { previous } => {
                NotificationEvent::FeatureDeleted { object: previous }
            }
            LegacyNotificationEvent::ExperimentCreated { current } => {
                NotificationEvent::ExperimentCreated { object: current }
            }
            LegacyNotificationEvent::ExperimentUpdated { current } => {
                NotificationEvent::ExperimentUpdated { object: current }
            }
            LegacyNotificationEvent::ExperimentDeleted { previous } => {
                NotificationEvent::ExperimentDeleted { object: previous }
            }
            LegacyNotificationEvent::ExperimentWarning(warning) => {
                NotificationEvent::ExperimentWarning { object: warning }
            }
            LegacyNotificationEvent::WebhookTest { webhook_id } => NotificationEvent::WebhookTest {
                object: WebhookTestObject { webhook_id },
            },
        }
    }
}
