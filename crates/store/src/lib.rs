//! Persistence for the subscription service.
//!
//! - [`Repository`]: JSON document storage per entity kind, with equality filters
//! - [`EventLog`]: the append-only log of domain events drained on every write
//! - [`HealthCheck`]: a round-trip check of the backing database
//!
//! Two backends implement all three: [`InMemoryStore`] and [`PostgresStore`].

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod repository;

pub use common::AggregateId;
pub use error::{Result, StoreError};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::EventQuery;
pub use repository::{
    Entity, EventLog, Filter, HealthCheck, Repository, RepositoryExt,
};
