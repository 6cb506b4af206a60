//! Role aggregate.

use chrono::{DateTime, Utc};
use common::{AggregateId, RoleId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{Aggregate, RaisedEvent, impl_entity};

use super::{RoleCreatedData, RoleDeletedData, RoleEvent, UserError};

const MAX_DESCRIPTION_LENGTH: usize = 500;

/// The fixed set of role names a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RoleName {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::Student, RoleName::Teacher, RoleName::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Student => "Student",
            RoleName::Teacher => "Teacher",
            RoleName::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role name: {0}")]
pub struct ParseRoleNameError(pub String);

impl std::str::FromStr for RoleName {
    type Err = ParseRoleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRoleNameError(s.to_string()))
    }
}

/// A role users can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: RoleName,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    pending_events: Vec<RaisedEvent<RoleEvent>>,
}

impl Aggregate for Role {
    type Event = RoleEvent;

    const AGGREGATE_TYPE: &'static str = "Role";

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn pending_events(&self) -> &[RaisedEvent<RoleEvent>] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<RaisedEvent<RoleEvent>> {
        std::mem::take(&mut self.pending_events)
    }
}

impl_entity!(Role, "roles");

impl Role {
    pub fn create(
        name: RoleName,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(UserError::DescriptionTooLong);
        }

        let id = RoleId::new();
        let mut role = Self {
            id,
            name,
            description,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };
        role.pending_events.push(RaisedEvent::new(
            RoleEvent::RoleCreated(RoleCreatedData { role_id: id, name }),
            now,
        ));
        Ok(role)
    }

    pub fn id(&self) -> RoleId {
        self.id
    }

    pub fn name(&self) -> RoleName {
        self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records the deletion; whether users still hold the role is checked by the caller.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.pending_events.push(RaisedEvent::new(
            RoleEvent::RoleDeleted(RoleDeletedData {
                role_id: self.id,
                name: self.name,
            }),
            now,
        ));
    }
}
