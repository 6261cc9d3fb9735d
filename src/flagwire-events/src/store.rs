//! Event store accessor.
//!
//! The notification pipeline only ever reads events back by id, to attribute
//! an action to whoever performed it. The trait keeps the persistence layer
//! out of this crate; tests and the CLI use [`InMemoryEventStore`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::record::EventRecord;

/// Read access to persisted events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch a persisted event by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store is unreachable. Callers that
    /// only need attribution treat errors the same as a missing event.
    async fn get_event(&self, event_id: &str) -> anyhow::Result<Option<EventRecord>>;
}

/// An in-memory event store for tests and operator tooling.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<String, EventRecord>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, keyed by its id.
    pub fn insert(&self, record: EventRecord) {
        self.events
            .write()
            .expect("event store lock poisoned")
            .insert(record.id.clone(), record);
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().expect("event store lock poisoned").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get_event(&self, event_id: &str) -> anyhow::Result<Option<EventRecord>> {
        Ok(self
            .events
            .read()
            .expect("event store lock poisoned")
            .get(event_id)
            .cloned())
    }
}
