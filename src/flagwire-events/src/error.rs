//! Error types for event parsing.
//!
//! Unknown event kinds and warning sub-types are exhaustiveness violations:
//! they mean a new variant was added to the domain model without updating the
//! notification pipeline. They must fail loudly rather than drop the event.

use thiserror::Error;

/// Errors that can occur while parsing a persisted event payload.
#[derive(Error, Debug)]
pub enum EventParseError {
    /// The `event` discriminator is not a known notification kind.
    #[error("unhandled notification event kind: {kind}")]
    UnknownEventKind {
        /// The unrecognized discriminator value.
        kind: String,
    },

    /// The `experiment.warning` sub-type is not a known warning kind.
    #[error("unhandled experiment warning kind: {kind}")]
    UnknownWarningKind {
        /// The unrecognized sub-type value.
        kind: String,
    },

    /// The payload is missing its `event` discriminator entirely.
    #[error("event payload has no event discriminator")]
    MissingEventKind,

    /// The discriminator was recognized but the payload did not deserialize.
    #[error("malformed {kind} payload: {source}")]
    Malformed {
        /// The event kind whose payload failed to deserialize.
        kind: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for event parsing.
pub type EventParseResult<T> = std::result::Result<T, EventParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EventParseError::UnknownEventKind {
            kind: "feature.archived".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unhandled notification event kind: feature.archived"
        );

        let err = EventParseError::UnknownWarningKind {
            kind: "underpowered".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unhandled experiment warning kind: underpowered"
        );
    }
}
