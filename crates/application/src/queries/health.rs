//! Database health check.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;

use crate::dto::DatabaseHealthDto;
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

#[derive(Debug, Clone)]
pub struct CheckDatabaseHealth;

impl Request for CheckDatabaseHealth {
    type Response = DatabaseHealthDto;
}

#[derive(Clone)]
pub struct HealthQueries {
    repos: Repositories,
}

impl HealthQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Handler<CheckDatabaseHealth> for HealthQueries {
    async fn handle(&self, _request: CheckDatabaseHealth) -> Result<DatabaseHealthDto> {
        let started = Instant::now();
        let result = self.repos.health.ping().await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let health = match result {
            Ok(()) => DatabaseHealthDto {
                is_healthy: true,
                status: "Healthy".to_string(),
                response_time_ms,
                error: None,
                timestamp: Utc::now(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "database health check failed");
                DatabaseHealthDto {
                    is_healthy: false,
                    status: "Unhealthy".to_string(),
                    response_time_ms,
                    error: Some(err.to_string()),
                    timestamp: Utc::now(),
                }
            }
        };
        Ok(health)
    }
}
