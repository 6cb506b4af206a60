//! Payment transaction aggregate.

mod aggregate;
mod events;
mod state;

pub use aggregate::Transaction;
pub use events::{PaymentCompletedData, PaymentFailedData, TransactionCreatedData, TransactionEvent, TransactionRef};
pub use state::{ParsePaymentError, PaymentProvider, PaymentStatus};

use thiserror::Error;

/// Errors that can occur during transaction operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Transaction code cannot be empty")]
    CodeRequired,

    #[error("Transaction is already marked as paid")]
    AlreadyPaid,

    #[error("Cannot mark a paid transaction as failed")]
    PaidCannotFail,

    #[error("Cannot cancel a paid transaction")]
    PaidCannotCancel,

    /// Any other move the payment state machine does not allow.
    #[error("Cannot change payment status from {from} to {to}")]
    InvalidStatusTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}
