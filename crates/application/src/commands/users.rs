//! Role and user commands.

use async_trait::async_trait;
use chrono::Utc;
use common::{Outcome, RoleId, UserId};
use domain::{Role, RoleName, RoleRepositoryExt, User, UserRepositoryExt};

use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

pub(crate) const ROLE_NOT_FOUND: &str = "Role not found";
pub(crate) const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, Clone)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
}

impl Request for CreateRole {
    type Response = Outcome<RoleId>;
}

/// Deletes a role no user holds.
#[derive(Debug, Clone)]
pub struct DeleteRole {
    pub id: RoleId,
}

impl Request for DeleteRole {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
}

impl Request for CreateUser {
    type Response = Outcome<UserId>;
}

#[derive(Debug, Clone)]
pub struct ChangeUserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
}

impl Request for ChangeUserRole {
    type Response = Outcome;
}

#[derive(Clone)]
pub struct UserCommands {
    repos: Repositories,
}

impl UserCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Handler<CreateRole> for UserCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: CreateRole) -> Result<Outcome<RoleId>> {
        let Ok(name) = request.name.parse::<RoleName>() else {
            return Ok(Outcome::failure("Role name must be Student, Teacher, or Admin"));
        };
        if self.repos.roles.find_by_role_name(name).await?.is_some() {
            return Ok(Outcome::failure(format!("Role with name '{name}' already exists")));
        }

        let mut role = match Role::create(name, request.description.as_deref(), Utc::now()) {
            Ok(role) => role,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };
        self.repos.roles.add(&mut role).await?;
        Ok(Outcome::success(role.id()))
    }
}

#[async_trait]
impl Handler<DeleteRole> for UserCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: DeleteRole) -> Result<Outcome> {
        let Some(mut role) = self.repos.roles.get_by_id(request.id.into()).await? else {
            return Ok(Outcome::not_found(ROLE_NOT_FOUND));
        };
        if self.repos.users.any_with_role(request.id).await? {
            return Ok(Outcome::failure("Cannot delete role that is assigned to users"));
        }

        role.mark_deleted(Utc::now());
        self.repos.roles.delete(&mut role).await?;
        Ok(Outcome::ok())
    }
}

#[async_trait]
impl Handler<CreateUser> for UserCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: CreateUser) -> Result<Outcome<UserId>> {
        if self.repos.roles.get_by_id(request.role_id.into()).await?.is_none() {
            return Ok(Outcome::not_found(ROLE_NOT_FOUND));
        }

        let mut user = match User::create(
            &request.email,
            &request.first_name,
            &request.last_name,
            request.role_id,
            Utc::now(),
        ) {
            Ok(user) => user,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };
        if self.repos.users.find_by_email(user.email()).await?.is_some() {
            return Ok(Outcome::failure(format!(
                "User with email '{}' already exists",
                user.email()
            )));
        }

        self.repos.users.add(&mut user).await?;
        Ok(Outcome::success(user.id()))
    }
}

#[async_trait]
impl Handler<ChangeUserRole> for UserCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: ChangeUserRole) -> Result<Outcome> {
        let Some(mut user) = self.repos.users.get_by_id(request.user_id.into()).await? else {
            return Ok(Outcome::not_found(USER_NOT_FOUND));
        };
        if self.repos.roles.get_by_id(request.role_id.into()).await?.is_none() {
            return Ok(Outcome::not_found(ROLE_NOT_FOUND));
        }

        user.change_role(request.role_id, Utc::now());
        self.repos.users.update(&mut user).await?;
        Ok(Outcome::ok())
    }
}
