//! Notification event model for Flagwire.
//!
//! This crate defines the domain events a Flagwire deployment can emit
//! (feature changes, experiment changes, experiment warnings, significance
//! updates, webhook connectivity tests) and the seams the notification
//! pipeline is built against:
//!
//! - [`NotificationEvent`] - the current, versioned wire shape
//! - [`LegacyNotificationEvent`] - the pre-versioning wire shape, convertible
//!   into the current one so downstream renderers only handle one form
//! - [`EventRecord`] - the persisted event envelope with actor attribution
//! - [`EventStore`] - async accessor for persisted events
//! - [`FilterEngine`] - decides whether an event is eligible for notification
//!   and extracts routing metadata
//!
//! All values here are request-scoped: constructed from a persisted record,
//! transformed once, and discarded after delivery.

pub mod error;
pub mod filter;
pub mod legacy;
pub mod notification;
pub mod record;
pub mod store;

// Re-export main types
pub use error::EventParseError;
pub use filter::{FilterData, FilterEngine, TagFilterEngine};
pub use legacy::LegacyNotificationEvent;
pub use notification::{
    ExperimentObject, ExperimentWarning, FeatureObject, NotificationEvent, SignificanceRecord,
};
pub use record::{EventRecord, EventUser};
pub use store::{EventStore, InMemoryEventStore};
