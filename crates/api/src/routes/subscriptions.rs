//! User subscription endpoints and the admin dashboard.

use application::commands::{
    ActivateSubscription, CancelSubscription, DeleteSubscription, ExpireSubscription,
    RenewSubscription, SubscribeResult, SubscribeToPro, SubscribeToTier, SuspendSubscription,
};
use application::dto::{DashboardStatsDto, SubscriptionClaimsDto, UserSubscriptionDto};
use application::queries::{
    GetAllSubscriptions, GetCurrentSubscription, GetDashboardStats, GetSubscriptionById,
    GetSubscriptionClaims,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{SubscriptionId, TierId, UserId};
use domain::PaymentProvider;
use serde::Deserialize;

use super::{CreatedResponse, created, found, no_content, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{CurrentUser, JsonBody, QueryParams};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub tier_id: TierId,
    #[serde(default)]
    pub payment_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    pub new_end_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSubscriptionsQuery {
    pub status: Option<String>,
}

/// GET /me: the caller's active subscription, or the free plan.
#[tracing::instrument(skip(state))]
pub async fn current(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserSubscriptionDto>, ApiError> {
    let subscription = state
        .mediator
        .send(GetCurrentSubscription { user_id })
        .await?;
    Ok(Json(
        subscription.unwrap_or_else(|| UserSubscriptionDto::free(user_id)),
    ))
}

/// GET /claims/{user_id}
#[tracing::instrument(skip(state))]
pub async fn claims(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SubscriptionClaimsDto>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    Ok(Json(
        state
            .mediator
            .send(GetSubscriptionClaims { user_id })
            .await?,
    ))
}

/// POST /subscribe: starts a pending subscription and its transaction.
#[tracing::instrument(skip(state, req))]
pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(req): JsonBody<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResult>), ApiError> {
    let payment_provider = match req.payment_provider.as_deref() {
        Some(raw) => raw
            .parse::<PaymentProvider>()
            .map_err(|err| ApiError::BadRequest(err.to_string()))?,
        None => PaymentProvider::default(),
    };
    let result = state
        .mediator
        .send(SubscribeToTier {
            user_id,
            tier_id: req.tier_id,
            payment_provider,
        })
        .await?
        .into_result()?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /subscribe/pro
#[tracing::instrument(skip(state))]
pub async fn subscribe_pro(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<CreatedResponse<SubscriptionId>>), ApiError> {
    created(state.mediator.send(SubscribeToPro { user_id }).await?)
}

/// POST /cancel
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state
        .mediator
        .send(CancelSubscription { user_id })
        .await?
        .into_result()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/subscriptions?status=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListSubscriptionsQuery>,
) -> Result<Json<Vec<UserSubscriptionDto>>, ApiError> {
    let subscriptions = state
        .mediator
        .send(GetAllSubscriptions {
            status: query.status,
        })
        .await?;
    Ok(Json(subscriptions))
}

/// GET /admin/subscriptions/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserSubscriptionDto>, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    found(
        state.mediator.send(GetSubscriptionById { id }).await?,
        "Subscription",
    )
}

/// POST /admin/subscriptions/{id}/activate
#[tracing::instrument(skip(state))]
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    no_content(state.mediator.send(ActivateSubscription { id }).await?)
}

/// POST /admin/subscriptions/{id}/suspend
#[tracing::instrument(skip(state))]
pub async fn suspend(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    no_content(state.mediator.send(SuspendSubscription { id }).await?)
}

/// POST /admin/subscriptions/{id}/renew
#[tracing::instrument(skip(state, req))]
pub async fn renew(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<RenewRequest>,
) -> Result<StatusCode, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    let outcome = state
        .mediator
        .send(RenewSubscription {
            id,
            new_end_date: req.new_end_date,
        })
        .await?;
    no_content(outcome)
}

/// POST /admin/subscriptions/{id}/expire
#[tracing::instrument(skip(state))]
pub async fn expire(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    no_content(state.mediator.send(ExpireSubscription { id }).await?)
}

/// DELETE /admin/subscriptions/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SubscriptionId = parse_id(&id)?;
    no_content(state.mediator.send(DeleteSubscription { id }).await?)
}

/// GET /admin/stats
#[tracing::instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStatsDto>, ApiError> {
    Ok(Json(state.mediator.send(GetDashboardStats).await?))
}
