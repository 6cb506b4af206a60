//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::shared::MoneyError;
use crate::subscription::SubscriptionError;
use crate::tier::TierError;
use crate::transaction::TransactionError;
use crate::user::UserError;

/// Any error the domain layer can raise.
///
/// Rule violations display their own message unchanged so callers can show
/// them to users as-is.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error(transparent)]
    Tier(#[from] TierError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The store failed; not a rule violation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Returns true if the error is a broken business rule rather than an
    /// infrastructure failure.
    pub fn is_rule_violation(&self) -> bool {
        !matches!(self, DomainError::Store(_))
    }
}
