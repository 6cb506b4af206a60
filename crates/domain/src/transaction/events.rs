//! Transaction domain events.

use common::{SubscriptionId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::shared::Money;

/// Events that can occur on a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TransactionEvent {
    TransactionCreated(TransactionCreatedData),

    /// The payment went through; the linked subscription should be activated.
    PaymentCompleted(PaymentCompletedData),

    PaymentFailed(PaymentFailedData),
    PaymentCancelled(TransactionRef),
    PaymentRefunded(TransactionRef),
}

impl DomainEvent for TransactionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TransactionEvent::TransactionCreated(_) => "TransactionCreated",
            TransactionEvent::PaymentCompleted(_) => "PaymentCompleted",
            TransactionEvent::PaymentFailed(_) => "PaymentFailed",
            TransactionEvent::PaymentCancelled(_) => "PaymentCancelled",
            TransactionEvent::PaymentRefunded(_) => "PaymentRefunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCreatedData {
    pub transaction_id: TransactionId,
    pub transaction_code: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCompletedData {
    pub transaction_id: TransactionId,
    pub subscription_id: SubscriptionId,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailedData {
    pub transaction_id: TransactionId,
    pub transaction_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRef {
    pub transaction_id: TransactionId,
    pub subscription_id: SubscriptionId,
}
