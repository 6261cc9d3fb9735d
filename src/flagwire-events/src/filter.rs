//! Notification filtering.
//!
//! Before a message is built, the filter engine decides whether an event is
//! eligible for notification at all and extracts the metadata integrations
//! route on (tags, projects). A `None` decision is a normal short-circuit,
//! not an error: the dispatcher stops before doing any actor lookups.
//!
//! Webhook connectivity tests never pass through here - they are always
//! considered "for" the webhook under test.

use serde::{Deserialize, Serialize};

use crate::notification::NotificationEvent;

/// Routing metadata extracted from an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    /// Tags attached to the changed object.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Projects the changed object belongs to.
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Decides whether an event should be notified and with what routing data.
pub trait FilterEngine: Send + Sync {
    /// Extract filter data for an event, or `None` to suppress notification.
    fn filter_data_for_event(&self, event: &NotificationEvent) -> Option<FilterData>;
}

/// Default engine: every event is eligible, routed by the tags and project
/// carried on its payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagFilterEngine;

impl FilterEngine for TagFilterEngine {
    fn filter_data_for_event(&self, event: &NotificationEvent) -> Option<FilterData> {
        let data = match event {
            NotificationEvent::FeatureCreated { object }
            | NotificationEvent::FeatureUpdated { object }
            | NotificationEvent::FeatureDeleted { object } => FilterData {
                tags: object.tags.clone(),
                projects: object.project.clone().into_iter().collect(),
            },
            NotificationEvent::ExperimentCreated { object }
            | NotificationEvent::ExperimentUpdated { object }
            | NotificationEvent::ExperimentDeleted { object } => FilterData {
                tags: object.tags.clone(),
                projects: object.project.clone().into_iter().collect(),
            },
            // Warnings and significance updates carry no routing metadata of
            // their own; they go to every integration.
            NotificationEvent::ExperimentWarning { .. }
            | NotificationEvent::ExperimentInfoSignificance { .. }
            | NotificationEvent::UserLogin { .. }
            | NotificationEvent::WebhookTest { .. } => FilterData::default(),
        };
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{ExperimentObject, FeatureObject};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feature_tags_and_project_extracted() {
        let event = NotificationEvent::FeatureUpdated {
            object: FeatureObject {
                id: "flag".into(),
                project: Some("growth".into()),
                tags: vec!["checkout".into(), "beta".into()],
            },
        };

        let data = TagFilterEngine.filter_data_for_event(&event).unwrap();
        assert_eq!(data.tags, vec!["checkout".to_string(), "beta".to_string()]);
        assert_eq!(data.projects, vec!["growth".to_string()]);
    }

    #[test]
    fn test_experiment_without_project() {
        let event = NotificationEvent::ExperimentDeleted {
            object: ExperimentObject {
                id: "exp".into(),
                name: "Exp".into(),
                project: None,
                tags: vec![],
            },
        };

        let data = TagFilterEngine.filter_data_for_event(&event).unwrap();
        assert_eq!(data, FilterData::default());
    }
}
