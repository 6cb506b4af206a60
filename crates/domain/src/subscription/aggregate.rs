//! User subscription aggregate implementation.

use chrono::{DateTime, TimeDelta, Utc};
use common::{AggregateId, SubscriptionId, TierId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, RaisedEvent, impl_entity};

use super::{
    SubscriptionError, SubscriptionEvent, SubscriptionRef, SubscriptionStatus,
    events::{SubscriptionCreatedData, SubscriptionDeletedData, SubscriptionRenewedData},
};

/// A user's subscription to a tier.
///
/// Represents the subscription lifecycle from creation (pending payment or
/// immediately active) through suspension, renewal, cancellation or expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
    id: SubscriptionId,
    user_id: UserId,
    tier_id: TierId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: SubscriptionStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    pending_events: Vec<RaisedEvent<SubscriptionEvent>>,
}

impl Aggregate for UserSubscription {
    type Event = SubscriptionEvent;

    const AGGREGATE_TYPE: &'static str = "UserSubscription";

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn pending_events(&self) -> &[RaisedEvent<SubscriptionEvent>] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<RaisedEvent<SubscriptionEvent>> {
        std::mem::take(&mut self.pending_events)
    }
}

impl_entity!(UserSubscription, "user_subscriptions");

// Constructors
impl UserSubscription {
    /// Creates a subscription awaiting payment.
    pub fn create_pending(
        user_id: UserId,
        tier_id: TierId,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        if start_date >= end_date {
            return Err(SubscriptionError::InvalidPeriod);
        }

        let id = SubscriptionId::new();
        let mut subscription = Self {
            id,
            user_id,
            tier_id,
            start_date,
            end_date,
            status: SubscriptionStatus::Pending,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };
        subscription.record(
            SubscriptionEvent::SubscriptionCreated(SubscriptionCreatedData {
                subscription_id: id,
                user_id,
                tier_id,
                start_date,
                end_date,
            }),
            now,
        );
        Ok(subscription)
    }

    /// Creates a subscription that is usable right away.
    pub fn create_active(
        user_id: UserId,
        tier_id: TierId,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        let mut subscription = Self::create_pending(user_id, tier_id, start_date, end_date, now)?;
        subscription.activate(now)?;
        Ok(subscription)
    }

    /// Creates a subscription starting now and lasting `duration_in_days`.
    pub fn pending_for_days(
        user_id: UserId,
        tier_id: TierId,
        duration_in_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        let end_date = period_end(now, duration_in_days)?;
        Self::create_pending(user_id, tier_id, now, end_date, now)
    }

    /// Like [`pending_for_days`](Self::pending_for_days), but active right away.
    pub fn active_for_days(
        user_id: UserId,
        tier_id: TierId,
        duration_in_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        let end_date = period_end(now, duration_in_days)?;
        Self::create_active(user_id, tier_id, now, end_date, now)
    }
}

/// `start` plus `days`, or `InvalidPeriod` when the date is out of range.
fn period_end(start: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>, SubscriptionError> {
    TimeDelta::try_days(i64::from(days))
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or(SubscriptionError::InvalidPeriod)
}

// Query methods
impl UserSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tier_id(&self) -> TierId {
        self.tier_id
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true once `now` is past the end date.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    /// Returns true if the subscription is Active and not past its end date.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && !self.is_expired_at(now)
    }

    /// The end date as unix seconds.
    pub fn expires_at_timestamp(&self) -> i64 {
        self.end_date.timestamp()
    }

    /// Returns true while the subscription still holds on to its tier.
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }
}

// Command methods
impl UserSubscription {
    /// Activates a pending or suspended subscription.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), SubscriptionError> {
        if self.status == SubscriptionStatus::Active {
            return Err(SubscriptionError::AlreadyActive);
        }
        self.ensure(self.status.can_activate(), "activate")?;
        if self.is_expired_at(now) {
            return Err(SubscriptionError::Expired);
        }

        self.transition(SubscriptionStatus::Active, now);
        let event = SubscriptionEvent::SubscriptionActivated(self.reference());
        self.record(event, now);
        Ok(())
    }

    /// Suspends an active subscription.
    pub fn suspend(&mut self, now: DateTime<Utc>) -> Result<(), SubscriptionError> {
        self.ensure(self.status.can_suspend(), "suspend")?;

        self.transition(SubscriptionStatus::Suspended, now);
        let event = SubscriptionEvent::SubscriptionSuspended(self.reference());
        self.record(event, now);
        Ok(())
    }

    /// Cancels a subscription that has not ended yet.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), SubscriptionError> {
        if self.status == SubscriptionStatus::Cancelled {
            return Err(SubscriptionError::AlreadyCancelled);
        }
        self.ensure(self.status.can_cancel(), "cancel")?;

        self.transition(SubscriptionStatus::Cancelled, now);
        let event = SubscriptionEvent::SubscriptionCancelled(self.reference());
        self.record(event, now);
        Ok(())
    }

    /// Moves the end date to `new_end_date` and makes the subscription active.
    pub fn renew(
        &mut self,
        new_end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), SubscriptionError> {
        self.ensure(self.status.can_renew(), "renew")?;
        if new_end_date <= self.end_date {
            return Err(SubscriptionError::InvalidRenewal);
        }

        self.end_date = new_end_date;
        self.transition(SubscriptionStatus::Active, now);
        self.record(
            SubscriptionEvent::SubscriptionRenewed(SubscriptionRenewedData {
                subscription_id: self.id,
                user_id: self.user_id,
                new_end_date,
            }),
            now,
        );
        Ok(())
    }

    /// Marks an active or suspended subscription as expired.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), SubscriptionError> {
        self.ensure(self.status.can_expire(), "expire")?;

        self.transition(SubscriptionStatus::Expired, now);
        let event = SubscriptionEvent::SubscriptionExpired(self.reference());
        self.record(event, now);
        Ok(())
    }

    /// Records the deletion. Allowed in every state; the caller removes the
    /// document from the repository.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.record(
            SubscriptionEvent::SubscriptionDeleted(SubscriptionDeletedData {
                subscription_id: self.id,
                user_id: self.user_id,
                status: self.status,
            }),
            now,
        );
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), SubscriptionError> {
        if allowed {
            Ok(())
        } else {
            Err(SubscriptionError::InvalidStateTransition {
                current: self.status,
                action,
            })
        }
    }

    fn transition(&mut self, status: SubscriptionStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    fn reference(&self) -> SubscriptionRef {
        SubscriptionRef {
            subscription_id: self.id,
            user_id: self.user_id,
        }
    }

    fn record(&mut self, event: SubscriptionEvent, now: DateTime<Utc>) {
        self.pending_events.push(RaisedEvent::new(event, now));
    }
}
