//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;
use store::{EventEnvelope, EventId};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + Clone + std::fmt::Debug + Send + Sync {
    /// Returns the event type name.
    ///
    /// This is used as the event log's `event_type` column.
    fn event_type(&self) -> &'static str;
}

/// A domain event as it was raised: the payload plus its identity and time.
///
/// Fields are private so a raised event cannot be altered after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct RaisedEvent<E> {
    event_id: EventId,
    occurred_on: DateTime<Utc>,
    payload: E,
}

impl<E: DomainEvent> RaisedEvent<E> {
    pub fn new(payload: E, occurred_on: DateTime<Utc>) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_on,
            payload,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    /// Wraps the event for the event log.
    pub fn into_envelope(
        self,
        aggregate_id: AggregateId,
        aggregate_type: &'static str,
    ) -> store::Result<EventEnvelope> {
        EventEnvelope::builder()
            .event_id(self.event_id)
            .event_type(self.payload.event_type())
            .aggregate_id(aggregate_id)
            .aggregate_type(aggregate_type)
            .occurred_on(self.occurred_on)
            .payload(&self.payload)?
            .build()
    }
}

/// Trait for aggregates that record domain events on state transitions.
///
/// Aggregates are plain state machines: guarded mutators validate the
/// transition, update the state and record an event. The repository drains
/// the recorded events when the aggregate is persisted.
pub trait Aggregate: Send + Sync {
    /// The type of events this aggregate produces.
    type Event: DomainEvent;

    /// The aggregate type name, recorded with every event.
    const AGGREGATE_TYPE: &'static str;

    /// Returns the aggregate's identifier.
    fn aggregate_id(&self) -> AggregateId;

    /// Events recorded since the aggregate was loaded or last persisted.
    fn pending_events(&self) -> &[RaisedEvent<Self::Event>];

    /// Removes and returns the recorded events.
    fn take_pending_events(&mut self) -> Vec<RaisedEvent<Self::Event>>;

    /// Drains the recorded events into envelopes for the event log.
    fn drain_envelopes(&mut self) -> store::Result<Vec<EventEnvelope>> {
        let aggregate_id = self.aggregate_id();
        self.take_pending_events()
            .into_iter()
            .map(|event| event.into_envelope(aggregate_id, Self::AGGREGATE_TYPE))
            .collect()
    }

    /// Returns the names of the recorded events, oldest first.
    fn pending_event_types(&self) -> Vec<&'static str> {
        self.pending_events()
            .iter()
            .map(RaisedEvent::event_type)
            .collect()
    }
}

/// Implements [`store::Entity`] for an aggregate by draining its events.
macro_rules! impl_entity {
    ($aggregate:ty, $table:literal) => {
        impl store::Entity for $aggregate {
            const KIND: &'static str = <$aggregate as $crate::aggregate::Aggregate>::AGGREGATE_TYPE;
            const TABLE: &'static str = $table;

            fn entity_id(&self) -> common::AggregateId {
                $crate::aggregate::Aggregate::aggregate_id(self)
            }

            fn take_events(&mut self) -> store::Result<Vec<store::EventEnvelope>> {
                $crate::aggregate::Aggregate::drain_envelopes(self)
            }
        }
    };
}

pub(crate) use impl_entity;
