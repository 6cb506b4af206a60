//! Domain-specific lookups layered on the generic [`Repository`].
//!
//! Each extension trait is implemented for every repository of its entity,
//! so the in-memory and Postgres backends get these queries for free.

use async_trait::async_trait;
use common::{RoleId, SubscriptionId, TierId, UserId};
use store::{Filter, Repository, RepositoryExt, Result};

use crate::subscription::{SubscriptionStatus, UserSubscription};
use crate::tier::SubscriptionTier;
use crate::transaction::{PaymentProvider, PaymentStatus, Transaction};
use crate::user::{Role, RoleName, User};

#[async_trait]
pub trait SubscriptionRepositoryExt: Repository<UserSubscription> {
    /// All subscriptions a user ever had, oldest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<UserSubscription>> {
        self.find_by(Filter::new().eq("user_id", user_id.to_string()))
            .await
    }

    /// The user's Active subscription with the latest end date.
    async fn active_for_user(&self, user_id: UserId) -> Result<Option<UserSubscription>> {
        let filter = Filter::new()
            .eq("user_id", user_id.to_string())
            .eq("status", SubscriptionStatus::Active.as_str());
        Ok(self
            .find_by(filter)
            .await?
            .into_iter()
            .max_by_key(UserSubscription::end_date))
    }

    async fn find_by_status(&self, status: SubscriptionStatus) -> Result<Vec<UserSubscription>> {
        self.find_by(Filter::new().eq("status", status.as_str()))
            .await
    }

    /// Returns true if a Pending, Active or Suspended subscription uses the tier.
    async fn has_live_for_tier(&self, tier_id: TierId) -> Result<bool> {
        Ok(self
            .find_by(Filter::new().eq("tier_id", tier_id.to_string()))
            .await?
            .iter()
            .any(UserSubscription::is_live))
    }
}

impl<T: Repository<UserSubscription> + ?Sized> SubscriptionRepositoryExt for T {}

#[async_trait]
pub trait TierRepositoryExt: Repository<SubscriptionTier> {
    /// Finds a tier by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<SubscriptionTier>> {
        self.find_one(Filter::new().eq("name", name.trim())).await
    }

    async fn find_active(&self) -> Result<Vec<SubscriptionTier>> {
        self.find_by(Filter::new().eq("is_active", true)).await
    }
}

impl<T: Repository<SubscriptionTier> + ?Sized> TierRepositoryExt for T {}

#[async_trait]
pub trait TransactionRepositoryExt: Repository<Transaction> {
    async fn find_by_subscription(&self, subscription_id: SubscriptionId) -> Result<Vec<Transaction>> {
        self.find_by(Filter::new().eq("user_subscription_id", subscription_id.to_string()))
            .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Transaction>> {
        self.find_one(Filter::new().eq("transaction_code", code)).await
    }

    /// Transactions filtered by status and provider; `None` matches any.
    async fn find_filtered(
        &self,
        status: Option<PaymentStatus>,
        provider: Option<PaymentProvider>,
    ) -> Result<Vec<Transaction>> {
        let mut filter = Filter::new();
        if let Some(status) = status {
            filter = filter.eq("payment_status", status.as_str());
        }
        if let Some(provider) = provider {
            filter = filter.eq("payment_provider", provider.as_str());
        }
        self.find_by(filter).await
    }
}

impl<T: Repository<Transaction> + ?Sized> TransactionRepositoryExt for T {}

#[async_trait]
pub trait RoleRepositoryExt: Repository<Role> {
    async fn find_by_role_name(&self, name: RoleName) -> Result<Option<Role>> {
        self.find_one(Filter::new().eq("name", name.as_str())).await
    }
}

impl<T: Repository<Role> + ?Sized> RoleRepositoryExt for T {}

#[async_trait]
pub trait UserRepositoryExt: Repository<User> {
    /// Returns true if any user holds the role.
    async fn any_with_role(&self, role_id: RoleId) -> Result<bool> {
        self.any(Filter::new().eq("role_id", role_id.to_string())).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one(Filter::new().eq("email", email.trim().to_lowercase()))
            .await
    }
}

impl<T: Repository<User> + ?Sized> UserRepositoryExt for T {}
