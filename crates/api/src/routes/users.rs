//! Role and user endpoints.

use application::commands::{ChangeUserRole, CreateRole, CreateUser, DeleteRole};
use application::dto::{RoleDto, UserDto};
use application::queries::{GetRoleById, GetRoles, GetUserById};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{RoleId, UserId};
use serde::Deserialize;

use super::{CreatedResponse, created, found, no_content, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role_id: RoleId,
}

/// GET /roles
#[tracing::instrument(skip(state))]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleDto>>, ApiError> {
    Ok(Json(state.mediator.send(GetRoles).await?))
}

/// GET /roles/{id}
#[tracing::instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoleDto>, ApiError> {
    let id: RoleId = parse_id(&id)?;
    found(state.mediator.send(GetRoleById { id }).await?, "Role")
}

/// POST /roles
#[tracing::instrument(skip(state, req))]
pub async fn create_role(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRoleRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<RoleId>>), ApiError> {
    let outcome = state
        .mediator
        .send(CreateRole {
            name: req.name,
            description: req.description,
        })
        .await?;
    created(outcome)
}

/// DELETE /roles/{id}
#[tracing::instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: RoleId = parse_id(&id)?;
    no_content(state.mediator.send(DeleteRole { id }).await?)
}

/// POST /users
#[tracing::instrument(skip(state, req))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<UserId>>), ApiError> {
    let outcome = state
        .mediator
        .send(CreateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role_id: req.role_id,
        })
        .await?;
    created(outcome)
}

/// GET /users/{id}
#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let id: UserId = parse_id(&id)?;
    found(state.mediator.send(GetUserById { id }).await?, "User")
}

/// PUT /users/{id}/role
#[tracing::instrument(skip(state, req))]
pub async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ChangeRoleRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id: UserId = parse_id(&id)?;
    let outcome = state
        .mediator
        .send(ChangeUserRole {
            user_id,
            role_id: req.role_id,
        })
        .await?;
    no_content(outcome)
}
