//! Transaction aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, SubscriptionId, TransactionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, RaisedEvent, impl_entity};
use crate::shared::Money;

use super::{
    PaymentCompletedData, PaymentFailedData, PaymentProvider, PaymentStatus,
    TransactionCreatedData, TransactionError, TransactionEvent, TransactionRef,
};

/// A payment attempt for a user subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    transaction_code: String,
    amount: Money,
    payment_provider: PaymentProvider,
    payment_status: PaymentStatus,
    provider_transaction_id: Option<String>,
    user_subscription_id: SubscriptionId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    pending_events: Vec<RaisedEvent<TransactionEvent>>,
}

impl Aggregate for Transaction {
    type Event = TransactionEvent;

    const AGGREGATE_TYPE: &'static str = "Transaction";

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn pending_events(&self) -> &[RaisedEvent<TransactionEvent>] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<RaisedEvent<TransactionEvent>> {
        std::mem::take(&mut self.pending_events)
    }
}

impl_entity!(Transaction, "transactions");

impl Transaction {
    /// Creates a pending transaction for a subscription.
    pub fn create(
        transaction_code: &str,
        amount: Money,
        payment_provider: PaymentProvider,
        user_subscription_id: SubscriptionId,
        now: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        let transaction_code = transaction_code.trim();
        if transaction_code.is_empty() {
            return Err(TransactionError::CodeRequired);
        }

        let id = TransactionId::new();
        let mut transaction = Self {
            id,
            transaction_code: transaction_code.to_string(),
            amount: amount.clone(),
            payment_provider,
            payment_status: PaymentStatus::Pending,
            provider_transaction_id: None,
            user_subscription_id,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };
        transaction.record(
            TransactionEvent::TransactionCreated(TransactionCreatedData {
                transaction_id: id,
                transaction_code: transaction.transaction_code.clone(),
                amount,
            }),
            now,
        );
        Ok(transaction)
    }

    /// Generates a unique, human readable transaction code:
    /// `TXN-<yyyyMMddHHmmss>-<8 hex chars>`.
    pub fn generate_code(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase();
        format!("TXN-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn transaction_code(&self) -> &str {
        &self.transaction_code
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn payment_provider(&self) -> PaymentProvider {
        self.payment_provider
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn provider_transaction_id(&self) -> Option<&str> {
        self.provider_transaction_id.as_deref()
    }

    pub fn user_subscription_id(&self) -> SubscriptionId {
        self.user_subscription_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Moves the payment to `status`.
    ///
    /// A provider reference, when given, replaces the stored one. A blank
    /// reference is ignored.
    pub fn update_status(
        &mut self,
        status: PaymentStatus,
        provider_transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransactionError> {
        use PaymentStatus::*;

        match (self.payment_status, status) {
            (Paid, Paid) => return Err(TransactionError::AlreadyPaid),
            (Paid, Failed) => return Err(TransactionError::PaidCannotFail),
            (Paid, Cancelled) => return Err(TransactionError::PaidCannotCancel),
            (from, to) if !from.can_transition_to(to) => {
                return Err(TransactionError::InvalidStatusTransition { from, to });
            }
            _ => {}
        }

        self.payment_status = status;
        if let Some(reference) = provider_transaction_id
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
        {
            self.provider_transaction_id = Some(reference);
        }
        self.updated_at = now;

        let event = match status {
            Paid => TransactionEvent::PaymentCompleted(PaymentCompletedData {
                transaction_id: self.id,
                subscription_id: self.user_subscription_id,
                amount: self.amount.clone(),
            }),
            Failed => TransactionEvent::PaymentFailed(PaymentFailedData {
                transaction_id: self.id,
                transaction_code: self.transaction_code.clone(),
            }),
            Cancelled => TransactionEvent::PaymentCancelled(self.reference()),
            Refunded => TransactionEvent::PaymentRefunded(self.reference()),
            Pending => return Ok(()),
        };
        self.record(event, now);
        Ok(())
    }

    fn reference(&self) -> TransactionRef {
        TransactionRef {
            transaction_id: self.id,
            subscription_id: self.user_subscription_id,
        }
    }

    fn record(&mut self, event: TransactionEvent, now: DateTime<Utc>) {
        self.pending_events.push(RaisedEvent::new(event, now));
    }
}
