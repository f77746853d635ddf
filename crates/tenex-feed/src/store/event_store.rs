use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::FeedEvent;

/// Store shared between the relay source (writer) and views (readers).
pub type SharedEventStore = Arc<RwLock<EventStore>>;

/// Append-only snapshot of every event received so far.
///
/// Events are deduplicated by id and never modified; thread and reply
/// indexes only record ids, so every derived view is recomputed from the
/// events themselves.
#[derive(Debug, Default)]
pub struct EventStore {
    events: HashMap<String, FeedEvent>,
    /// Ids in arrival order
    arrival: Vec<String>,
    thread_ids: Vec<String>,
    /// Root id -> ids of events carrying that `E` reference
    related_by_root: HashMap<String, Vec<String>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedEventStore {
        Arc::new(RwLock::new(Self::new()))
    }

    // ===== Mutations =====

    /// Add an event. Returns `false` when the id was already known.
    pub fn insert(&mut self, event: FeedEvent) -> bool {
        if self.events.contains_key(&event.id) {
            return false;
        }

        if event.is_thread() {
            self.thread_ids.push(event.id.clone());
        }
        if let Some(root) = event.root_ref() {
            self.related_by_root
                .entry(root.to_string())
                .or_default()
                .push(event.id.clone());
        }
        self.arrival.push(event.id.clone());
        self.events.insert(event.id.clone(), event);
        true
    }

    /// Add many events, returning how many were new.
    pub fn extend<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = FeedEvent>,
    {
        events
            .into_iter()
            .map(|event| self.insert(event))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.arrival.clear();
        self.thread_ids.clear();
        self.related_by_root.clear();
    }

    // ===== Getters =====

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FeedEvent> {
        self.events.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.contains_key(id)
    }

    /// All events in arrival order
    pub fn events(&self) -> impl Iterator<Item = &FeedEvent> {
        self.arrival.iter().filter_map(|id| self.events.get(id))
    }

    /// Root threads in arrival order
    pub fn threads(&self) -> impl Iterator<Item = &FeedEvent> {
        self.thread_ids.iter().filter_map(|id| self.events.get(id))
    }

    /// Every event whose `E` tag names `root_id`, regardless of kind
    pub fn related(&self, root_id: &str) -> Vec<&FeedEvent> {
        self.related_by_root
            .get(root_id)
            .map(|ids| ids.iter().filter_map(|id| self.events.get(id)).collect())
            .unwrap_or_default()
    }
}
