//! Subscription commands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Outcome, SubscriptionId, TierId, TransactionId, UserId};
use domain::{
    PaymentProvider, SubscriptionError, SubscriptionRepositoryExt, TierRepositoryExt,
    Transaction, UserSubscription,
};
use serde::Serialize;

use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

pub(crate) const SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";
const PRO_TIER_NAME: &str = "Pro";

/// Starts a paid subscription: a pending subscription plus a pending
/// transaction for the tier's price.
#[derive(Debug, Clone)]
pub struct SubscribeToTier {
    pub user_id: UserId,
    pub tier_id: TierId,
    pub payment_provider: PaymentProvider,
}

impl Request for SubscribeToTier {
    type Response = Outcome<SubscribeResult>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeResult {
    pub subscription_id: SubscriptionId,
    pub transaction_id: TransactionId,
    pub transaction_code: String,
    pub amount: i64,
    pub currency: String,
}

/// Subscribes a user to the "Pro" tier without payment. The subscription is
/// active immediately.
#[derive(Debug, Clone)]
pub struct SubscribeToPro {
    pub user_id: UserId,
}

impl Request for SubscribeToPro {
    type Response = Outcome<SubscriptionId>;
}

/// Cancels the user's active subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscription {
    pub user_id: UserId,
}

impl Request for CancelSubscription {
    type Response = Outcome<SubscriptionId>;
}

#[derive(Debug, Clone)]
pub struct ActivateSubscription {
    pub id: SubscriptionId,
}

impl Request for ActivateSubscription {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct SuspendSubscription {
    pub id: SubscriptionId,
}

impl Request for SuspendSubscription {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct RenewSubscription {
    pub id: SubscriptionId,
    pub new_end_date: DateTime<Utc>,
}

impl Request for RenewSubscription {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct ExpireSubscription {
    pub id: SubscriptionId,
}

impl Request for ExpireSubscription {
    type Response = Outcome;
}

/// Removes a subscription regardless of its state.
#[derive(Debug, Clone)]
pub struct DeleteSubscription {
    pub id: SubscriptionId,
}

impl Request for DeleteSubscription {
    type Response = Outcome;
}

/// Handles every subscription command.
#[derive(Clone)]
pub struct SubscriptionCommands {
    repos: Repositories,
}

impl SubscriptionCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn has_active_subscription(&self, user_id: UserId, now: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .repos
            .subscriptions
            .active_for_user(user_id)
            .await?
            .is_some_and(|subscription| subscription.is_active_at(now)))
    }

    /// Loads the subscription, applies `change` and saves it.
    async fn transition<F>(&self, id: SubscriptionId, change: F) -> Result<Outcome>
    where
        F: FnOnce(&mut UserSubscription, DateTime<Utc>) -> std::result::Result<(), SubscriptionError>
            + Send,
    {
        let Some(mut subscription) = self.repos.subscriptions.get_by_id(id.into()).await? else {
            return Ok(Outcome::not_found(SUBSCRIPTION_NOT_FOUND));
        };
        if let Err(err) = change(&mut subscription, Utc::now()) {
            return Ok(Outcome::failure(err.to_string()));
        }
        self.repos.subscriptions.update(&mut subscription).await?;
        Ok(Outcome::ok())
    }
}

#[async_trait]
impl Handler<SubscribeToTier> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: SubscribeToTier) -> Result<Outcome<SubscribeResult>> {
        let now = Utc::now();
        let Some(tier) = self.repos.tiers.get_by_id(request.tier_id.into()).await? else {
            return Ok(Outcome::not_found("Subscription tier not found"));
        };
        if !tier.is_active() {
            return Ok(Outcome::failure("Subscription tier is not active"));
        }
        if self.has_active_subscription(request.user_id, now).await? {
            return Ok(Outcome::failure("User already has an active subscription"));
        }

        let mut subscription = match UserSubscription::pending_for_days(
            request.user_id,
            tier.id(),
            tier.duration_in_days(),
            now,
        ) {
            Ok(subscription) => subscription,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };
        let mut transaction = match Transaction::create(
            &Transaction::generate_code(now),
            tier.price().clone(),
            request.payment_provider,
            subscription.id(),
            now,
        ) {
            Ok(transaction) => transaction,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };

        self.repos.subscriptions.add(&mut subscription).await?;
        self.repos.transactions.add(&mut transaction).await?;

        tracing::info!(
            user_id = %request.user_id,
            subscription_id = %subscription.id(),
            transaction_code = transaction.transaction_code(),
            "subscription awaiting payment"
        );

        Ok(Outcome::success(SubscribeResult {
            subscription_id: subscription.id(),
            transaction_id: transaction.id(),
            transaction_code: transaction.transaction_code().to_string(),
            amount: transaction.amount().amount(),
            currency: transaction.amount().currency().to_string(),
        }))
    }
}

#[async_trait]
impl Handler<SubscribeToPro> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: SubscribeToPro) -> Result<Outcome<SubscriptionId>> {
        let now = Utc::now();
        if self.has_active_subscription(request.user_id, now).await? {
            return Ok(Outcome::failure("User already has an active subscription"));
        }
        let Some(tier) = self.repos.tiers.find_by_name(PRO_TIER_NAME).await? else {
            return Ok(Outcome::failure("Pro subscription tier not found"));
        };

        let mut subscription = match UserSubscription::active_for_days(
            request.user_id,
            tier.id(),
            tier.duration_in_days(),
            now,
        ) {
            Ok(subscription) => subscription,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };
        self.repos.subscriptions.add(&mut subscription).await?;

        tracing::info!(
            user_id = %request.user_id,
            subscription_id = %subscription.id(),
            "user subscribed to Pro tier"
        );
        Ok(Outcome::success(subscription.id()))
    }
}

#[async_trait]
impl Handler<CancelSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: CancelSubscription) -> Result<Outcome<SubscriptionId>> {
        let now = Utc::now();
        let Some(mut subscription) = self
            .repos
            .subscriptions
            .active_for_user(request.user_id)
            .await?
        else {
            return Ok(Outcome::failure("No active subscription found for this user"));
        };
        if !subscription.is_active_at(now) {
            return Ok(Outcome::failure("Subscription is already cancelled or expired"));
        }
        if let Err(err) = subscription.cancel(now) {
            return Ok(Outcome::failure(err.to_string()));
        }
        self.repos.subscriptions.update(&mut subscription).await?;

        tracing::info!(
            user_id = %request.user_id,
            subscription_id = %subscription.id(),
            "subscription cancelled"
        );
        Ok(Outcome::success(subscription.id()))
    }
}

#[async_trait]
impl Handler<ActivateSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: ActivateSubscription) -> Result<Outcome> {
        self.transition(request.id, |subscription, now| subscription.activate(now))
            .await
    }
}

#[async_trait]
impl Handler<SuspendSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: SuspendSubscription) -> Result<Outcome> {
        self.transition(request.id, |subscription, now| subscription.suspend(now))
            .await
    }
}

#[async_trait]
impl Handler<RenewSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: RenewSubscription) -> Result<Outcome> {
        let new_end_date = request.new_end_date;
        self.transition(request.id, move |subscription, now| {
            subscription.renew(new_end_date, now)
        })
        .await
    }
}

#[async_trait]
impl Handler<ExpireSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: ExpireSubscription) -> Result<Outcome> {
        self.transition(request.id, |subscription, now| subscription.expire(now))
            .await
    }
}

#[async_trait]
impl Handler<DeleteSubscription> for SubscriptionCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: DeleteSubscription) -> Result<Outcome> {
        let Some(mut subscription) = self
            .repos
            .subscriptions
            .get_by_id(request.id.into())
            .await?
        else {
            return Ok(Outcome::not_found(SUBSCRIPTION_NOT_FOUND));
        };
        if subscription.is_live() {
            tracing::warn!(
                subscription_id = %subscription.id(),
                status = %subscription.status(),
                "deleting a subscription that is still in use"
            );
        }

        subscription.mark_deleted(Utc::now());
        self.repos.subscriptions.delete(&mut subscription).await?;
        Ok(Outcome::ok())
    }
}
