//! Users and the roles they are assigned.

mod events;
mod role;
#[allow(clippy::module_inception)]
mod user;

pub use events::{
    RoleCreatedData, RoleDeletedData, RoleEvent, UserCreatedData, UserEvent, UserRoleChangedData,
};
pub use role::{ParseRoleNameError, Role, RoleName};
pub use user::User;

use thiserror::Error;

/// Errors that can occur during user and role operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("Email is not valid")]
    InvalidEmail,

    #[error("First name cannot be empty")]
    FirstNameRequired,

    #[error("Last name cannot be empty")]
    LastNameRequired,

    #[error("Role description cannot exceed 500 characters")]
    DescriptionTooLong,
}
