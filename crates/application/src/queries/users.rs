//! Role and user queries.

use async_trait::async_trait;
use common::{RoleId, UserId};

use crate::dto::{RoleDto, UserDto};
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

#[derive(Debug, Clone)]
pub struct GetRoles;

impl Request for GetRoles {
    type Response = Vec<RoleDto>;
}

#[derive(Debug, Clone)]
pub struct GetRoleById {
    pub id: RoleId,
}

impl Request for GetRoleById {
    type Response = Option<RoleDto>;
}

#[derive(Debug, Clone)]
pub struct GetUserById {
    pub id: UserId,
}

impl Request for GetUserById {
    type Response = Option<UserDto>;
}

#[derive(Clone)]
pub struct UserQueries {
    repos: Repositories,
}

impl UserQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Handler<GetRoles> for UserQueries {
    async fn handle(&self, _request: GetRoles) -> Result<Vec<RoleDto>> {
        let roles = self.repos.roles.list().await?;
        Ok(roles.iter().map(RoleDto::from).collect())
    }
}

#[async_trait]
impl Handler<GetRoleById> for UserQueries {
    async fn handle(&self, request: GetRoleById) -> Result<Option<RoleDto>> {
        let role = self.repos.roles.get_by_id(request.id.into()).await?;
        Ok(role.as_ref().map(RoleDto::from))
    }
}

#[async_trait]
impl Handler<GetUserById> for UserQueries {
    async fn handle(&self, request: GetUserById) -> Result<Option<UserDto>> {
        let user = self.repos.users.get_by_id(request.id.into()).await?;
        Ok(user.as_ref().map(UserDto::from))
    }
}
