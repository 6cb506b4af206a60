//! Read models returned by queries and commands.

use chrono::{DateTime, Utc};
use common::{RoleId, SubscriptionId, TierId, TransactionId, UserId};
use domain::{Role, SubscriptionTier, Transaction, User, UserSubscription};
use serde::Serialize;
use store::{AggregateId, EventEnvelope, EventId};

/// Plan name shown for subscriptions whose tier no longer exists.
pub const UNKNOWN_PLAN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionTierDto {
    pub id: TierId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: i64,
    pub currency: String,
    pub duration_in_days: u32,
    pub target_role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SubscriptionTier> for SubscriptionTierDto {
    fn from(tier: &SubscriptionTier) -> Self {
        Self {
            id: tier.id(),
            name: tier.name().to_string(),
            description: tier.description().to_string(),
            image_url: tier.image_url().map(str::to_string),
            price: tier.price().amount(),
            currency: tier.price().currency().to_string(),
            duration_in_days: tier.duration_in_days(),
            target_role: tier.target_role().to_string(),
            is_active: tier.is_active(),
            created_at: tier.created_at(),
            updated_at: tier.updated_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSubscriptionDto {
    /// `None` for the default free plan.
    pub id: Option<SubscriptionId>,
    pub user_id: UserId,
    pub subscription_tier_id: Option<TierId>,
    pub plan_name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub is_active: bool,
    pub is_expired: bool,
    pub expires_at_timestamp: i64,
}

impl UserSubscriptionDto {
    pub fn from_subscription(
        subscription: &UserSubscription,
        plan_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(subscription.id()),
            user_id: subscription.user_id(),
            subscription_tier_id: Some(subscription.tier_id()),
            plan_name: plan_name.into(),
            start_date: Some(subscription.start_date()),
            end_date: Some(subscription.end_date()),
            status: subscription.status().to_string(),
            is_active: subscription.is_active_at(now),
            is_expired: subscription.is_expired_at(now),
            expires_at_timestamp: subscription.expires_at_timestamp(),
        }
    }

    /// What a user without an active subscription sees.
    pub fn free(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            subscription_tier_id: None,
            plan_name: "Free".to_string(),
            start_date: None,
            end_date: None,
            status: "None".to_string(),
            is_active: false,
            is_expired: true,
            expires_at_timestamp: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDto {
    pub id: TransactionId,
    pub transaction_code: String,
    pub amount: i64,
    pub currency: String,
    pub payment_provider: String,
    pub payment_status: String,
    pub provider_transaction_id: Option<String>,
    pub user_subscription_id: SubscriptionId,
    pub subscription_plan_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionDto {
    pub fn from_transaction(transaction: &Transaction, plan_name: impl Into<String>) -> Self {
        Self {
            id: transaction.id(),
            transaction_code: transaction.transaction_code().to_string(),
            amount: transaction.amount().amount(),
            currency: transaction.amount().currency().to_string(),
            payment_provider: transaction.payment_provider().to_string(),
            payment_status: transaction.payment_status().to_string(),
            provider_transaction_id: transaction.provider_transaction_id().map(str::to_string),
            user_subscription_id: transaction.user_subscription_id(),
            subscription_plan_name: plan_name.into(),
            created_at: transaction.created_at(),
            updated_at: transaction.updated_at(),
        }
    }
}

/// Lightweight subscription facts other services put into access tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionClaimsDto {
    pub user_id: UserId,
    /// Lower-cased tier name, or `"free"`.
    pub plan: String,
    /// Unix seconds; 0 on the free plan.
    pub expires_at: i64,
    pub has_active_subscription: bool,
}

impl SubscriptionClaimsDto {
    pub fn free(user_id: UserId) -> Self {
        Self {
            user_id,
            plan: "free".to_string(),
            expires_at: 0,
            has_active_subscription: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenueItem {
    /// e.g. `"Mar 2026"`.
    pub month: String,
    pub revenue: i64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionStatusItem {
    pub status: String,
    pub count: usize,
    /// Share of all subscriptions, rounded to one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatsDto {
    pub total_revenue: i64,
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub expired_subscriptions: usize,
    pub cancelled_subscriptions: usize,
    pub suspended_subscriptions: usize,
    pub monthly_revenue: Vec<MonthlyRevenueItem>,
    pub status_distribution: Vec<SubscriptionStatusItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDto {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Role> for RoleDto {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id(),
            name: role.name().to_string(),
            description: role.description().map(str::to_string),
            created_at: role.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            full_name: user.full_name(),
            role_id: user.role_id(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Serialized in camelCase: `isHealthy`, `status`, `responseTimeMs`, `error`, `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealthDto {
    pub is_healthy: bool,
    pub status: String,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One entry of the domain event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEventDto {
    pub event_id: EventId,
    pub event_type: String,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,
    pub occurred_on: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<EventEnvelope> for DomainEventDto {
    fn from(event: EventEnvelope) -> Self {
        Self {
            event_id: event.event_id,
            event_type: event.event_type,
            aggregate_id: event.aggregate_id,
            aggregate_type: event.aggregate_type,
            occurred_on: event.occurred_on,
            payload: event.payload,
        }
    }
}
