//! Subscription tier endpoints, public listing and admin management.

use application::TierInput;
use application::commands::{
    ActivateSubscriptionTier, CreateSubscriptionTier, DeactivateSubscriptionTier,
    DeleteSubscriptionTier, UpdateSubscriptionTier,
};
use application::dto::SubscriptionTierDto;
use application::queries::{GetActiveTiers, GetAllTiers, GetTierById};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::TierId;
use serde::Deserialize;

use super::{CreatedResponse, created, found, no_content, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};

#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub duration_in_days: i64,
}

fn default_currency() -> String {
    domain::Currency::DEFAULT.to_string()
}

impl From<TierRequest> for TierInput {
    fn from(req: TierRequest) -> Self {
        TierInput {
            name: req.name,
            description: req.description,
            image_url: req.image_url,
            price: req.price,
            currency: req.currency,
            duration_in_days: req.duration_in_days,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTierRequest {
    #[serde(flatten)]
    pub tier: TierRequest,
    #[serde(default)]
    pub target_role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTiersQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /tiers: tiers open for purchase.
#[tracing::instrument(skip(state))]
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionTierDto>>, ApiError> {
    Ok(Json(state.mediator.send(GetActiveTiers).await?))
}

/// GET /admin/tiers?include_inactive=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListTiersQuery>,
) -> Result<Json<Vec<SubscriptionTierDto>>, ApiError> {
    let tiers = state
        .mediator
        .send(GetAllTiers {
            include_inactive: query.include_inactive,
        })
        .await?;
    Ok(Json(tiers))
}

/// GET /admin/tiers/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionTierDto>, ApiError> {
    let id: TierId = parse_id(&id)?;
    found(state.mediator.send(GetTierById { id }).await?, "Subscription tier")
}

/// POST /admin/tiers
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTierRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<TierId>>), ApiError> {
    let outcome = state
        .mediator
        .send(CreateSubscriptionTier {
            tier: req.tier.into(),
            target_role: req.target_role,
        })
        .await?;
    created(outcome)
}

/// PUT /admin/tiers/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<TierRequest>,
) -> Result<StatusCode, ApiError> {
    let id: TierId = parse_id(&id)?;
    let outcome = state
        .mediator
        .send(UpdateSubscriptionTier {
            id,
            tier: req.into(),
        })
        .await?;
    no_content(outcome)
}

/// DELETE /admin/tiers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TierId = parse_id(&id)?;
    no_content(state.mediator.send(DeleteSubscriptionTier { id }).await?)
}

/// POST /admin/tiers/{id}/activate
#[tracing::instrument(skip(state))]
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TierId = parse_id(&id)?;
    no_content(state.mediator.send(ActivateSubscriptionTier { id }).await?)
}

/// POST /admin/tiers/{id}/deactivate
#[tracing::instrument(skip(state))]
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TierId = parse_id(&id)?;
    no_content(state.mediator.send(DeactivateSubscriptionTier { id }).await?)
}
