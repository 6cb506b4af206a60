//! Payment transaction endpoints.

use application::commands::UpdateTransactionStatus;
use application::dto::TransactionDto;
use application::queries::{GetAllTransactions, GetTransactionById, GetUserTransactions};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::TransactionId;
use serde::Deserialize;

use super::{found, no_content, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{CurrentUser, JsonBody, QueryParams};

#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    pub payment_status: Option<String>,
    pub payment_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub payment_status: String,
    #[serde(default)]
    pub provider_transaction_id: Option<String>,
}

/// GET /transactions/me: the caller's transactions, newest first.
#[tracing::instrument(skip(state))]
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<TransactionDto>>, ApiError> {
    Ok(Json(
        state.mediator.send(GetUserTransactions { user_id }).await?,
    ))
}

/// GET /admin/transactions?payment_status=&payment_provider=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionDto>>, ApiError> {
    let transactions = state
        .mediator
        .send(GetAllTransactions {
            payment_status: query.payment_status,
            payment_provider: query.payment_provider,
        })
        .await?;
    Ok(Json(transactions))
}

/// GET /admin/transactions/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDto>, ApiError> {
    let id: TransactionId = parse_id(&id)?;
    found(
        state.mediator.send(GetTransactionById { id }).await?,
        "Transaction",
    )
}

/// PUT /admin/transactions/{id}/status
#[tracing::instrument(skip(state, req))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<StatusCode, ApiError> {
    let id: TransactionId = parse_id(&id)?;
    let outcome = state
        .mediator
        .send(UpdateTransactionStatus {
            id,
            payment_status: req.payment_status,
            provider_transaction_id: req.provider_transaction_id,
        })
        .await?;
    no_content(outcome)
}
