//! Reads over the domain event log.

use async_trait::async_trait;
use common::SubscriptionId;
use store::EventQuery;

use crate::dto::DomainEventDto;
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

/// Page size used when a request names none.
pub const DEFAULT_EVENT_PAGE: usize = 100;

/// Largest page a single request may ask for.
pub const MAX_EVENT_PAGE: usize = 500;

/// Every event recorded for one subscription, oldest first.
///
/// The history outlives the subscription: a deleted subscription still
/// returns its events, ending with `SubscriptionDeleted`.
#[derive(Debug, Clone)]
pub struct GetSubscriptionHistory {
    pub id: SubscriptionId,
}

impl Request for GetSubscriptionHistory {
    type Response = Vec<DomainEventDto>;
}

/// A page of the event log across every aggregate.
#[derive(Debug, Clone, Default)]
pub struct GetDomainEvents {
    pub aggregate_type: Option<String>,
    pub event_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Request for GetDomainEvents {
    type Response = Vec<DomainEventDto>;
}

impl GetDomainEvents {
    fn to_query(&self) -> EventQuery {
        let mut query = EventQuery::new()
            .limit(self.limit.unwrap_or(DEFAULT_EVENT_PAGE).min(MAX_EVENT_PAGE))
            .offset(self.offset.unwrap_or(0));
        if let Some(ref aggregate_type) = self.aggregate_type {
            query = query.aggregate_type(aggregate_type.clone());
        }
        if let Some(ref event_type) = self.event_type {
            query = query.event_type(event_type.clone());
        }
        query
    }
}

#[derive(Clone)]
pub struct EventQueries {
    repos: Repositories,
}

impl EventQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Handler<GetSubscriptionHistory> for EventQueries {
    async fn handle(&self, request: GetSubscriptionHistory) -> Result<Vec<DomainEventDto>> {
        let events = self.repos.events.events_for(request.id.into()).await?;
        Ok(events.into_iter().map(DomainEventDto::from).collect())
    }
}

#[async_trait]
impl Handler<GetDomainEvents> for EventQueries {
    async fn handle(&self, request: GetDomainEvents) -> Result<Vec<DomainEventDto>> {
        let events = self.repos.events.query_events(request.to_query()).await?;
        Ok(events.into_iter().map(DomainEventDto::from).collect())
    }
}
