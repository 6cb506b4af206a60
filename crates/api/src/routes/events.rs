//! Read access to the domain event log.

use application::dto::DomainEventDto;
use application::queries::{GetDomainEvents, GetSubscriptionHistory};
use axum::Json;
use axum::extract::{Path, State};
use common::SubscriptionId;
use serde::Deserialize;

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::QueryParams;

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub aggregate_type: Option<String>,
    pub event_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /admin/subscriptions/{id}/events: the subscription's history, oldest first.
#[tracing::instrument(skip(state))]
pub async fn subscription_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DomainEventDto>>, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    Ok(Json(state.mediator.send(GetSubscriptionHistory { id }).await?))
}

/// GET /admin/events?aggregate_type=&event_type=&limit=&offset=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> Result<Json<Vec<DomainEventDto>>, ApiError> {
    let events = state
        .mediator
        .send(GetDomainEvents {
            aggregate_type: query.aggregate_type,
            event_type: query.event_type,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(events))
}
