//! User aggregate.

use chrono::{DateTime, Utc};
use common::{AggregateId, RoleId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, RaisedEvent, impl_entity};

use super::{UserCreatedData, UserError, UserEvent, UserRoleChangedData};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
    role_id: RoleId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    pending_events: Vec<RaisedEvent<UserEvent>>,
}

impl Aggregate for User {
    type Event = UserEvent;

    const AGGREGATE_TYPE: &'static str = "User";

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn pending_events(&self) -> &[RaisedEvent<UserEvent>] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<RaisedEvent<UserEvent>> {
        std::mem::take(&mut self.pending_events)
    }
}

impl_entity!(User, "users");

impl User {
    pub fn create(
        email: &str,
        first_name: &str,
        last_name: &str,
        role_id: RoleId,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let email = normalize_email(email)?;
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(UserError::FirstNameRequired);
        }
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(UserError::LastNameRequired);
        }

        let id = UserId::new();
        let mut user = Self {
            id,
            email: email.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role_id,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };
        user.record(
            UserEvent::UserCreated(UserCreatedData {
                user_id: id,
                email,
                role_id,
            }),
            now,
        );
        Ok(user)
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Assigns another role. Assigning the current role is a no-op.
    pub fn change_role(&mut self, role_id: RoleId, now: DateTime<Utc>) {
        if self.role_id == role_id {
            return;
        }

        let previous_role_id = self.role_id;
        self.role_id = role_id;
        self.updated_at = now;
        self.record(
            UserEvent::UserRoleChanged(UserRoleChangedData {
                user_id: self.id,
                previous_role_id,
                role_id,
            }),
            now,
        );
    }

    fn record(&mut self, event: UserEvent, now: DateTime<Utc>) {
        self.pending_events.push(RaisedEvent::new(event, now));
    }
}

fn normalize_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    if email.chars().any(char::is_whitespace) {
        return Err(UserError::InvalidEmail);
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(UserError::InvalidEmail),
    }
}
