//! Transaction commands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Outcome, TransactionId};
use domain::{
    DomainError, PaymentStatus, SubscriptionStatus, Transaction, UserSubscription,
};

use crate::error::{AppError, Result};
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

pub(crate) const TRANSACTION_NOT_FOUND: &str = "Transaction not found";

/// Moves a transaction to a new payment status.
///
/// Marking it `Paid` also activates the subscription it pays for, if that
/// subscription is still pending.
#[derive(Debug, Clone)]
pub struct UpdateTransactionStatus {
    pub id: TransactionId,
    pub payment_status: String,
    pub provider_transaction_id: Option<String>,
}

impl Request for UpdateTransactionStatus {
    type Response = Outcome;
}

#[derive(Clone)]
pub struct TransactionCommands {
    repos: Repositories,
}

impl TransactionCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

/// Applies the new status and activates `paid_for` when it is still pending.
///
/// Returns whether the subscription was activated. Nothing is saved here.
fn settle(
    transaction: &mut Transaction,
    paid_for: Option<&mut UserSubscription>,
    status: PaymentStatus,
    provider_transaction_id: Option<String>,
    now: DateTime<Utc>,
) -> std::result::Result<bool, DomainError> {
    transaction.update_status(status, provider_transaction_id, now)?;
    match paid_for {
        Some(subscription) if subscription.status() == SubscriptionStatus::Pending => {
            subscription.activate(now)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[async_trait]
impl Handler<UpdateTransactionStatus> for TransactionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: UpdateTransactionStatus) -> Result<Outcome> {
        let Some(mut transaction) = self.repos.transactions.get_by_id(request.id.into()).await?
        else {
            return Ok(Outcome::not_found(TRANSACTION_NOT_FOUND));
        };
        let Ok(status) = request.payment_status.parse::<PaymentStatus>() else {
            return Ok(Outcome::failure(format!(
                "Invalid payment status: {}. Valid values: Pending, Paid, Failed, Cancelled, Refunded",
                request.payment_status
            )));
        };

        let mut subscription = None;
        if status == PaymentStatus::Paid {
            let subscription_id = transaction.user_subscription_id();
            let Some(paid_for) = self
                .repos
                .subscriptions
                .get_by_id(subscription_id.into())
                .await?
            else {
                return Err(AppError::Unexpected(format!(
                    "Subscription {} paid by transaction {} does not exist",
                    subscription_id,
                    transaction.id()
                )));
            };
            subscription = Some(paid_for);
        }

        let now = Utc::now();
        let activated = match settle(
            &mut transaction,
            subscription.as_mut(),
            status,
            request.provider_transaction_id,
            now,
        ) {
            Ok(activated) => activated,
            Err(err) if err.is_rule_violation() => return Ok(Outcome::failure(err.to_string())),
            Err(err) => return Err(AppError::Unexpected(err.to_string())),
        };

        self.repos.transactions.update(&mut transaction).await?;
        if let (true, Some(mut subscription)) = (activated, subscription) {
            self.repos.subscriptions.update(&mut subscription).await?;
            tracing::info!(
                transaction_id = %transaction.id(),
                subscription_id = %subscription.id(),
                "payment completed, subscription activated"
            );
        }
        Ok(Outcome::ok())
    }
}

#[cfg(test)]
mod tests {
    use common::{TierId, UserId};
    use domain::{Money, PaymentProvider};

    use super::*;

    fn pair(now: DateTime<Utc>) -> (Transaction, UserSubscription) {
        let subscription =
            UserSubscription::pending_for_days(UserId::new(), TierId::new(), 30, now).unwrap();
        let transaction = Transaction::create(
            &Transaction::generate_code(now),
            Money::vnd(99_000).unwrap(),
            PaymentProvider::Momo,
            subscription.id(),
            now,
        )
        .unwrap();
        (transaction, subscription)
    }

    #[test]
    fn paying_activates_pending_subscription() {
        let now = Utc::now();
        let (mut transaction, mut subscription) = pair(now);

        let activated = settle(
            &mut transaction,
            Some(&mut subscription),
            PaymentStatus::Paid,
            None,
            now,
        )
        .unwrap();
        assert!(activated);
        assert_eq!(subscription.status(), SubscriptionStatus::Active);
    }

    #[test]
    fn active_subscription_is_left_alone() {
        let now = Utc::now();
        let (mut transaction, mut subscription) = pair(now);
        subscription.activate(now).unwrap();

        let activated = settle(
            &mut transaction,
            Some(&mut subscription),
            PaymentStatus::Paid,
            None,
            now,
        )
        .unwrap();
        assert!(!activated);
    }

    #[test]
    fn transaction_rule_is_a_rule_violation() {
        let now = Utc::now();
        let (mut transaction, _) = pair(now);
        settle(&mut transaction, None, PaymentStatus::Paid, None, now).unwrap();

        let err = settle(&mut transaction, None, PaymentStatus::Failed, None, now).unwrap_err();
        assert!(err.is_rule_violation());
        assert_eq!(err.to_string(), "Cannot mark a paid transaction as failed");
    }
}
