//! User subscription aggregate and its lifecycle.

mod aggregate;
mod events;
mod state;

pub use aggregate::UserSubscription;
pub use events::{
    SubscriptionCreatedData, SubscriptionDeletedData, SubscriptionEvent, SubscriptionRef,
    SubscriptionRenewedData,
};
pub use state::{ParseStatusError, SubscriptionStatus};

use thiserror::Error;

/// Errors that can occur during subscription operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("Start date must be before end date")]
    InvalidPeriod,

    #[error("Subscription is already active")]
    AlreadyActive,

    #[error("Subscription is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot activate an expired subscription")]
    Expired,

    #[error("New end date must be after current end date")]
    InvalidRenewal,

    /// The subscription is not in a state that allows the action.
    #[error("Cannot {action} a subscription that is {current}")]
    InvalidStateTransition {
        current: SubscriptionStatus,
        action: &'static str,
    },
}
