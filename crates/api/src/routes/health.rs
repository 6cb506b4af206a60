//! Health check endpoints.

use application::queries::CheckDatabaseHealth;
use application::dto::DatabaseHealthDto;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: process liveness.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /health/database: store round-trip, 503 when the store is unreachable.
#[tracing::instrument(skip(state))]
pub async fn database(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DatabaseHealthDto>), ApiError> {
    let health = state.mediator.send(CheckDatabaseHealth).await?;
    let status = if health.is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(health)))
}
