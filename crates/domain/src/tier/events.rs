//! Subscription tier domain events.

use common::TierId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::shared::Money;
use crate::user::RoleName;

/// Events that can occur on a subscription tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TierEvent {
    TierCreated(TierSnapshotData),
    TierUpdated(TierSnapshotData),
    TierActivated(TierRef),
    TierDeactivated(TierRef),
    TierDeleted(TierRef),
}

impl DomainEvent for TierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TierEvent::TierCreated(_) => "TierCreated",
            TierEvent::TierUpdated(_) => "TierUpdated",
            TierEvent::TierActivated(_) => "TierActivated",
            TierEvent::TierDeactivated(_) => "TierDeactivated",
            TierEvent::TierDeleted(_) => "TierDeleted",
        }
    }
}

/// The tier's identifying name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRef {
    pub tier_id: TierId,
    pub name: String,
}

/// The tier's commercial terms after creation or an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSnapshotData {
    pub tier_id: TierId,
    pub name: String,
    pub price: Money,
    pub duration_in_days: u32,
    pub target_role: RoleName,
}
