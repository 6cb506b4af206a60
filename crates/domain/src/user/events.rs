//! User and role domain events.

use common::{RoleId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::RoleName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    UserCreated(UserCreatedData),
    UserRoleChanged(UserRoleChangedData),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::UserCreated(_) => "UserCreated",
            UserEvent::UserRoleChanged(_) => "UserRoleChanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedData {
    pub user_id: UserId,
    pub email: String,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleChangedData {
    pub user_id: UserId,
    pub previous_role_id: RoleId,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RoleEvent {
    RoleCreated(RoleCreatedData),
    RoleDeleted(RoleDeletedData),
}

impl DomainEvent for RoleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RoleEvent::RoleCreated(_) => "RoleCreated",
            RoleEvent::RoleDeleted(_) => "RoleDeleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCreatedData {
    pub role_id: RoleId,
    pub name: RoleName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDeletedData {
    pub role_id: RoleId,
    pub name: RoleName,
}
