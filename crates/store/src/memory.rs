use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventQuery, Result, StoreError,
    repository::{
        Entity, EventLog, Filter, HealthCheck, Repository, record_write,
    },
};

#[derive(Debug, Clone)]
struct StoredDocument {
    sequence: u64,
    data: Value,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<&'static str, HashMap<AggregateId, StoredDocument>>,
    events: Vec<EventEnvelope>,
    next_sequence: u64,
}

impl Inner {
    fn collection(&mut self, table: &'static str) -> &mut HashMap<AggregateId, StoredDocument> {
        self.collections.entry(table).or_default()
    }

    fn sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }
}

/// In-memory store implementation.
///
/// Documents and events share one lock, so a write and the events it drains
/// become visible together, matching the transactional PostgreSQL backend.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events recorded.
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Clears all documents and events.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.collections.clear();
        inner.events.clear();
    }

    async fn documents<E: Entity>(&self, filter: &Filter) -> Result<Vec<E>> {
        let inner = self.inner.read().await;
        let Some(collection) = inner.collections.get(E::TABLE) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<&StoredDocument> = collection
            .values()
            .filter(|doc| filter.matches(&doc.data))
            .collect();
        matching.sort_by_key(|doc| doc.sequence);

        matching
            .into_iter()
            .map(|doc| serde_json::from_value(doc.data.clone()).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryStore {
    async fn get_by_id(&self, id: AggregateId) -> Result<Option<E>> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(E::TABLE)
            .and_then(|collection| collection.get(&id))
            .map(|doc| serde_json::from_value(doc.data.clone()).map_err(StoreError::from))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<E>> {
        self.documents(&Filter::new()).await
    }

    async fn find_by(&self, filter: Filter) -> Result<Vec<E>> {
        self.documents(&filter).await
    }

    async fn add(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;

        let mut inner = self.inner.write().await;
        if inner.collection(E::TABLE).contains_key(&id) {
            return Err(StoreError::AlreadyExists { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        let count = events.len();
        let sequence = inner.sequence();
        inner
            .collection(E::TABLE)
            .insert(id, StoredDocument { sequence, data });
        inner.events.extend(events);

        record_write(E::KIND, "add", count);
        Ok(())
    }

    async fn update(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;

        let mut inner = self.inner.write().await;
        if !inner.collection(E::TABLE).contains_key(&id) {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        let count = events.len();
        if let Some(existing) = inner.collection(E::TABLE).get_mut(&id) {
            existing.data = data;
        }
        inner.events.extend(events);

        record_write(E::KIND, "update", count);
        Ok(())
    }

    async fn save(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;

        let mut inner = self.inner.write().await;
        let events = entity.take_events()?;
        let count = events.len();

        let sequence = inner.sequence();
        inner
            .collection(E::TABLE)
            .entry(id)
            .and_modify(|doc| doc.data = data.clone())
            .or_insert(StoredDocument { sequence, data });
        inner.events.extend(events);

        record_write(E::KIND, "save", count);
        Ok(())
    }

    async fn delete(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();

        let mut inner = self.inner.write().await;
        if !inner.collection(E::TABLE).contains_key(&id) {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        let count = events.len();
        inner.collection(E::TABLE).remove(&id);
        inner.events.extend(events);

        record_write(E::KIND, "delete", count);
        Ok(())
    }
}

#[async_trait]
impl EventLog for InMemoryStore {
    async fn events_for(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        self.query_events(EventQuery::for_aggregate(aggregate_id))
            .await
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let inner = self.inner.read().await;
        // Events are kept in recording order; a stable sort keeps that order
        // for events sharing a timestamp.
        let mut events: Vec<_> = inner
            .events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.occurred_on);

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(events.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::RepositoryExt;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: AggregateId,
        owner: String,
        body: String,
        #[serde(skip)]
        pending: Vec<&'static str>,
        #[serde(skip)]
        broken: bool,
    }

    impl Note {
        fn new(owner: &str, body: &str) -> Self {
            Self {
                id: AggregateId::new(),
                owner: owner.to_string(),
                body: body.to_string(),
                pending: vec!["NoteCreated"],
                broken: false,
            }
        }
    }

    impl Entity for Note {
        const KIND: &'static str = "Note";
        const TABLE: &'static str = "notes";

        fn entity_id(&self) -> AggregateId {
            self.id
        }

        fn take_events(&mut self) -> Result<Vec<EventEnvelope>> {
            if self.broken {
                return Err(StoreError::InvalidEvent("event_type"));
            }
            std::mem::take(&mut self.pending)
                .into_iter()
                .map(|event_type| {
                    EventEnvelope::builder()
                        .event_type(event_type)
                        .aggregate_id(self.id)
                        .aggregate_type(Self::KIND)
                        .payload_raw(serde_json::json!({"owner": self.owner}))
                        .build()
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn add_and_get_by_id() {
        let store = InMemoryStore::new();
        let mut note = Note::new("alice", "hello");

        store.add(&mut note).await.unwrap();

        let loaded: Option<Note> = store.get_by_id(note.id).await.unwrap();
        assert_eq!(loaded.map(|n| n.body), Some("hello".to_string()));
        assert!(note.pending.is_empty());
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn add_twice_fails_with_already_exists() {
        let store = InMemoryStore::new();
        let mut note = Note::new("alice", "hello");
        store.add(&mut note).await.unwrap();

        let result = store.add(&mut note).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn update_missing_fails_with_not_found() {
        let store = InMemoryStore::new();
        let mut note = Note::new("alice", "hello");

        let result = store.update(&mut note).await;
        assert!(matches!(result, Err(StoreError::NotFound { kind: "Note", .. })));
        // Nothing was written, so the pending event is still there.
        assert_eq!(note.pending.len(), 1);
    }

    #[tokio::test]
    async fn failed_event_drain_leaves_documents_untouched() {
        let store = InMemoryStore::new();
        let mut note = Note::new("alice", "hello");
        store.add(&mut note).await.unwrap();

        note.body = "edited".to_string();
        note.broken = true;
        assert!(matches!(
            store.update(&mut note).await,
            Err(StoreError::InvalidEvent(_))
        ));
        assert!(matches!(
            store.save(&mut note).await,
            Err(StoreError::InvalidEvent(_))
        ));
        assert!(matches!(
            store.delete(&mut note).await,
            Err(StoreError::InvalidEvent(_))
        ));

        let loaded: Option<Note> = store.get_by_id(note.id).await.unwrap();
        assert_eq!(loaded.map(|n| n.body), Some("hello".to_string()));
        assert_eq!(store.event_count().await, 1);

        let mut fresh = Note::new("bob", "new");
        fresh.broken = true;
        assert!(store.save(&mut fresh).await.is_err());
        let loaded: Option<Note> = store.get_by_id(fresh.id).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_upserts_and_keeps_insertion_order() {
        let store = InMemoryStore::new();
        let mut first = Note::new("alice", "one");
        let mut second = Note::new("bob", "two");
        store.save(&mut first).await.unwrap();
        store.save(&mut second).await.unwrap();

        first.body = "one, edited".to_string();
        store.save(&mut first).await.unwrap();

        let notes: Vec<Note> = store.list().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].body, "one, edited");
        assert_eq!(notes[1].owner, "bob");
    }

    #[tokio::test]
    async fn find_by_filters_on_fields() {
        let store = InMemoryStore::new();
        store.add(&mut Note::new("alice", "a1")).await.unwrap();
        store.add(&mut Note::new("bob", "b1")).await.unwrap();
        store.add(&mut Note::new("alice", "a2")).await.unwrap();

        let alice: Vec<Note> = store
            .find_by(Filter::new().eq("owner", "alice"))
            .await
            .unwrap();
        assert_eq!(alice.len(), 2);

        let carol = RepositoryExt::<Note>::any(&store, Filter::new().eq("owner", "carol"))
            .await
            .unwrap();
        assert!(!carol);
    }

    #[tokio::test]
    async fn delete_removes_document_but_keeps_events() {
        let store = InMemoryStore::new();
        let mut note = Note::new("alice", "hello");
        store.add(&mut note).await.unwrap();

        note.pending.push("NoteDeleted");
        store.delete(&mut note).await.unwrap();

        let loaded: Option<Note> = store.get_by_id(note.id).await.unwrap();
        assert!(loaded.is_none());

        let events = store.events_for(note.id).await.unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["NoteCreated", "NoteDeleted"]);
    }

    #[tokio::test]
    async fn query_events_applies_paging() {
        let store = InMemoryStore::new();
        for body in ["a", "b", "c"] {
            store.add(&mut Note::new("alice", body)).await.unwrap();
        }

        let page = store
            .query_events(EventQuery::for_event_type("NoteCreated").offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn ping_is_always_healthy() {
        assert!(InMemoryStore::new().ping().await.is_ok());
    }
}
