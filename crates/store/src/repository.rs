use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{AggregateId, EventEnvelope, EventQuery, Result};

/// A document that can be persisted by a [`Repository`].
///
/// Entities are stored as JSON documents keyed by [`Entity::entity_id`]. Any
/// domain events the entity recorded since it was loaded are drained with
/// [`Entity::take_events`] and written to the event log in the same unit of
/// work as the document itself.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the entity kind, used as the event log's aggregate type.
    const KIND: &'static str;

    /// Table (or in-memory collection) the documents live in.
    const TABLE: &'static str;

    fn entity_id(&self) -> AggregateId;

    /// Removes and returns the events recorded since the last persist.
    fn take_events(&mut self) -> Result<Vec<EventEnvelope>>;
}

/// Equality conditions on top-level document fields.
///
/// Values are compared as JSON, so enums and ids must be given in their
/// serialized form (e.g. `"Active"`, or the UUID string).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// Creates a filter that matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the condition `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true if every condition holds for the document.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The conditions as a JSON object, suitable for a containment query.
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

/// Persistence for one entity kind.
///
/// Every write drains the entity's pending events and records them in the
/// event log atomically with the document change.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Loads an entity, returning `None` if it does not exist.
    async fn get_by_id(&self, id: AggregateId) -> Result<Option<E>>;

    /// Returns every entity of this kind in insertion order.
    async fn list(&self) -> Result<Vec<E>>;

    /// Returns the entities matching the filter, in insertion order.
    async fn find_by(&self, filter: Filter) -> Result<Vec<E>>;

    /// Inserts a new entity. Fails with `AlreadyExists` if the id is taken.
    async fn add(&self, entity: &mut E) -> Result<()>;

    /// Replaces an existing entity. Fails with `NotFound` if it is missing.
    async fn update(&self, entity: &mut E) -> Result<()>;

    /// Inserts or replaces the entity.
    async fn save(&self, entity: &mut E) -> Result<()>;

    /// Removes the entity. Fails with `NotFound` if it is missing.
    async fn delete(&self, entity: &mut E) -> Result<()>;
}

/// Extension trait providing convenience lookups on top of [`Repository`].
#[async_trait]
pub trait RepositoryExt<E: Entity>: Repository<E> {
    /// Checks if an entity with this id exists.
    async fn exists(&self, id: AggregateId) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    /// Returns the first entity matching the filter.
    async fn find_one(&self, filter: Filter) -> Result<Option<E>> {
        Ok(self.find_by(filter).await?.into_iter().next())
    }

    /// Checks if any entity matches the filter.
    async fn any(&self, filter: Filter) -> Result<bool> {
        Ok(!self.find_by(filter).await?.is_empty())
    }
}

// Blanket implementation for all Repository implementations
impl<E: Entity, T: Repository<E> + ?Sized> RepositoryExt<E> for T {}

/// Read access to the append-only domain event log.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Retrieves every event recorded for an entity, oldest first.
    async fn events_for(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events matching a query, oldest first.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;
}

/// Liveness check for the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Performs a trivial round trip; succeeds if the store is reachable.
    async fn ping(&self) -> Result<()>;
}

pub(crate) fn record_write(kind: &'static str, operation: &'static str, events: usize) {
    metrics::counter!("store_writes_total", "entity" => kind, "operation" => operation)
        .increment(1);
    if events > 0 {
        metrics::counter!("domain_events_recorded_total", "entity" => kind)
            .increment(events as u64);
    }
    tracing::debug!(entity = kind, operation, events, "document written");
}
