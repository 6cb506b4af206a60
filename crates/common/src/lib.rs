//! Shared types for the subscription service.
//!
//! - Typed identifiers for every aggregate
//! - `Outcome`, the success/failure wrapper returned by command handlers

pub mod outcome;
pub mod types;

pub use outcome::{Failure, FailureKind, Outcome, OutcomeError};
pub use types::{AggregateId, RoleId, SubscriptionId, TierId, TransactionId, UserId};
