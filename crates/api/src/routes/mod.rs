//! HTTP route handlers.

pub mod events;
pub mod health;
pub mod metrics;
pub mod subscriptions;
pub mod tiers;
pub mod transactions;
pub mod users;

use std::str::FromStr;

use axum::Json;
use axum::http::StatusCode;
use common::Outcome;
use serde::Serialize;

use crate::error::ApiError;

/// Body returned by create endpoints.
#[derive(Debug, Serialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}

/// Parses a path segment into a typed id.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {raw}")))
}

/// Unwraps a query result or answers 404.
pub(crate) fn found<T>(value: Option<T>, what: &str) -> Result<Json<T>, ApiError> {
    value
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{what} not found")))
}

/// Maps a command outcome to `204 No Content` or the failure's status.
pub(crate) fn no_content(outcome: Outcome) -> Result<StatusCode, ApiError> {
    outcome.into_result()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Maps a create outcome to `201 Created` with the new id.
pub(crate) fn created<T>(outcome: Outcome<T>) -> Result<(StatusCode, Json<CreatedResponse<T>>), ApiError> {
    let id = outcome.into_result()?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
