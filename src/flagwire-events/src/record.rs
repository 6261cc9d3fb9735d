//! The persisted event envelope.
//!
//! An [`EventRecord`] is what the event store hands back: an id, an optional
//! schema version marker, a creation timestamp and the raw notification
//! payload. A present `version` means the payload is in the current shape;
//! an absent one means the legacy shape.
//!
//! Parsing goes through a runtime kind guard: the `event` discriminator (and,
//! for `experiment.warning`, the warning sub-type) is checked against the
//! known kinds before deserializing, so values outside static control fail
//! with a typed, loud error instead of an opaque serde message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{EventParseError, EventParseResult};
use crate::legacy::LegacyNotificationEvent;
use crate::notification::{KNOWN_EVENT_KINDS, KNOWN_WARNING_KINDS, NotificationEvent};

/// Who performed the action an event records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventUser {
    /// The action came in through the REST API.
    #[serde(rename = "api_key", rename_all = "camelCase")]
    ApiKey {
        /// The full API key. Only the last four characters are ever rendered.
        api_key: String,
    },

    /// A human acting through the dashboard.
    #[serde(rename = "dashboard")]
    Dashboard {
        /// Display name.
        name: String,
        /// Login email.
        email: String,
    },
}

/// A persisted notification event, as returned by the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Store-assigned event id; also used in "View Event" links.
    pub id: String,

    /// Payload schema version. Present selects the current parser, absent
    /// the legacy parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// When the event was recorded.
    pub date_created: DateTime<Utc>,

    /// The raw notification payload (`event` discriminator plus `data`).
    pub data: Value,
}

impl EventRecord {
    /// Whether the payload is in the current, versioned shape.
    pub fn is_current(&self) -> bool {
        self.version.is_some()
    }

    /// The `event` discriminator string, if the payload has one.
    pub fn event_kind(&self) -> Option<&str> {
        self.data.get("event").and_then(Value::as_str)
    }

    /// The actor recorded on the payload, if any.
    ///
    /// Attribution is best-effort: a missing or malformed `user` field yields
    /// `None`, never an error - callers degrade to "an unknown user".
    pub fn user(&self) -> Option<EventUser> {
        let raw = self.data.get("user")?;
        match serde_json::from_value(raw.clone()) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(event_id = %self.id, %err, "unparseable event user, dropping attribution");
                None
            }
        }
    }

    /// Parse the payload as a current-shape event.
    pub fn parse_notification(&self) -> EventParseResult<NotificationEvent> {
        let kind = self.guard_event_kind()?;
        // Current shape nests the warning payload under data.object.
        if kind == "experiment.warning" {
            guard_warning_kind(self.data.pointer("/data/object/type"))?;
        }
        serde_json::from_value(self.data.clone()).map_err(|source| EventParseError::Malformed {
            kind: kind.to_string(),
            source,
        })
    }

    /// Parse the payload as a legacy-shape event.
    pub fn parse_legacy(&self) -> EventParseResult<LegacyNotificationEvent> {
        let kind = self.guard_event_kind()?;
        // Legacy significance events never existed; reject rather than let
        // serde produce an unknown-variant error.
        if kind == "experiment.info.significance" {
            return Err(EventParseError::UnknownEventKind {
                kind: kind.to_string(),
            });
        }
        // Legacy shape carries the warning payload directly as data.
        if kind == "experiment.warning" {
            guard_warning_kind(self.data.pointer("/data/type"))?;
        }
        serde_json::from_value(self.data.clone()).map_err(|source| EventParseError::Malformed {
            kind: kind.to_string(),
            source,
        })
    }

    fn guard_event_kind(&self) -> EventParseResult<&str> {
        let kind = self
            .event_kind()
            .ok_or(EventParseError::MissingEventKind)?;
        if !KNOWN_EVENT_KINDS.contains(&kind) {
            return Err(EventParseError::UnknownEventKind {
                kind: kind.to_string(),
            });
        }
        Ok(kind)
    }
}

fn guard_warning_kind(raw: Option<&Value>) -> EventParseResult<()> {
    let kind = raw.and_then(Value::as_str).unwrap_or("");
    if KNOWN_WARNING_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(EventParseError::UnknownWarningKind {
            kind: kind.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(version: Option<u32>, data: Value) -> EventRecord {
        EventRecord {
            id: "event-1".to_string(),
            version,
            date_created: Utc::now(),
            data,
        }
    }

    #[test]
    fn test_parse_current_event() {
        let record = record(
            Some(1),
            json!({
                "event": "feature.created",
                "data": { "object": { "id": "flag-a" } },
                "user": { "type": "dashboard", "name": "Ada", "email": "ada@example.com" }
            }),
        );

        assert!(record.is_current());
        let event = record.parse_notification().unwrap();
        assert_eq!(event.kind(), "feature.created");
        assert_matches!(record.user(), Some(EventUser::Dashboard { .. }));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let record = record(Some(1), json!({ "event": "feature.archived", "data": {} }));

        assert_matches!(
            record.parse_notification(),
            Err(EventParseError::UnknownEventKind { kind }) if kind == "feature.archived"
        );
    }

    #[test]
    fn test_unknown_warning_kind_is_rejected() {
        let record = record(
            Some(1),
            json!({
                "event": "experiment.warning",
                "data": { "object": { "type": "underpowered", "experimentId": "e", "experimentName": "E" } }
            }),
        );

        assert_matches!(
            record.parse_notification(),
            Err(EventParseError::UnknownWarningKind { kind }) if kind == "underpowered"
        );
    }

    #[test]
    fn test_legacy_warning_guard_reads_bare_payload() {
        let record = record(
            None,
            json!({
                "event": "experiment.warning",
                "data": {
                    "type": "auto-update",
                    "experimentId": "exp_2",
                    "experimentName": "Nav test",
                    "success": false
                }
            }),
        );

        let event = record.parse_legacy().unwrap();
        assert_eq!(event.kind(), "experiment.warning");
    }

    #[test]
    fn test_legacy_rejects_significance() {
        let record = record(
            None,
            json!({ "event": "experiment.info.significance", "data": { "object": [] } }),
        );

        assert_matches!(
            record.parse_legacy(),
            Err(EventParseError::UnknownEventKind { .. })
        );
    }

    #[test]
    fn test_missing_kind() {
        let record = record(Some(1), json!({ "data": {} }));
        assert_matches!(
            record.parse_notification(),
            Err(EventParseError::MissingEventKind)
        );
    }

    #[test]
    fn test_api_key_user() {
        let record = record(
            Some(1),
            json!({
                "event": "feature.deleted",
                "data": { "object": { "id": "f" } },
                "user": { "type": "api_key", "apiKey": "key_abcd1234" }
            }),
        );

        assert_matches!(
            record.user(),
            Some(EventUser::ApiKey { api_key }) if api_key == "key_abcd1234"
        );
    }

    #[test]
    fn test_malformed_user_degrades_to_none() {
        let record = record(
            Some(1),
            json!({
                "event": "feature.created",
                "data": { "object": { "id": "f" } },
                "user": { "type": "carrier_pigeon" }
            }),
        );

        assert_eq!(record.user(), None);
    }
}
