//! Subscription domain events.

use chrono::{DateTime, Utc};
use common::{SubscriptionId, TierId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::SubscriptionStatus;

/// Events that can occur on a user subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SubscriptionEvent {
    /// Subscription was created for a user and tier.
    SubscriptionCreated(SubscriptionCreatedData),

    /// Subscription became active (first payment or reactivation).
    SubscriptionActivated(SubscriptionRef),

    /// Subscription was suspended.
    SubscriptionSuspended(SubscriptionRef),

    /// Subscription end date was pushed back.
    SubscriptionRenewed(SubscriptionRenewedData),

    /// Subscription was cancelled.
    SubscriptionCancelled(SubscriptionRef),

    /// Subscription ran out.
    SubscriptionExpired(SubscriptionRef),

    /// Subscription was removed from the store.
    SubscriptionDeleted(SubscriptionDeletedData),
}

impl DomainEvent for SubscriptionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SubscriptionEvent::SubscriptionCreated(_) => "SubscriptionCreated",
            SubscriptionEvent::SubscriptionActivated(_) => "SubscriptionActivated",
            SubscriptionEvent::SubscriptionSuspended(_) => "SubscriptionSuspended",
            SubscriptionEvent::SubscriptionRenewed(_) => "SubscriptionRenewed",
            SubscriptionEvent::SubscriptionCancelled(_) => "SubscriptionCancelled",
            SubscriptionEvent::SubscriptionExpired(_) => "SubscriptionExpired",
            SubscriptionEvent::SubscriptionDeleted(_) => "SubscriptionDeleted",
        }
    }
}

/// Identifies the subscription and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRef {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
}

/// Data for SubscriptionCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCreatedData {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub tier_id: TierId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Data for SubscriptionRenewed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRenewedData {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub new_end_date: DateTime<Utc>,
}

/// Data for SubscriptionDeleted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDeletedData {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    /// Status at the moment of deletion.
    pub status: SubscriptionStatus,
}
