//! Subscription tier aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, TierId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, RaisedEvent, impl_entity};
use crate::shared::Money;
use crate::user::RoleName;

use super::{
    MAX_DESCRIPTION_LENGTH, MAX_DURATION_IN_DAYS, MAX_IMAGE_URL_LENGTH, MAX_NAME_LENGTH,
    TierError, TierEvent, TierRef, TierSnapshotData,
};

/// The editable terms of a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierDetails {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: Money,
    pub duration_in_days: u32,
}

impl TierDetails {
    /// Trims the text fields and checks the length limits.
    fn normalized(self) -> Result<Self, TierError> {
        let name = self.name.trim().to_string();
        let description = self.description.trim().to_string();
        let image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if name.is_empty() {
            return Err(TierError::NameRequired);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(TierError::NameTooLong);
        }
        if description.is_empty() {
            return Err(TierError::DescriptionRequired);
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(TierError::DescriptionTooLong);
        }
        if self.duration_in_days == 0 {
            return Err(TierError::InvalidDuration);
        }
        if self.duration_in_days > MAX_DURATION_IN_DAYS {
            return Err(TierError::DurationTooLong);
        }
        if image_url
            .as_ref()
            .is_some_and(|url| url.chars().count() > MAX_IMAGE_URL_LENGTH)
        {
            return Err(TierError::ImageUrlTooLong);
        }

        Ok(Self {
            name,
            description,
            image_url,
            ..self
        })
    }
}

/// A purchasable subscription tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionTier {
    id: TierId,
    name: String,
    description: String,
    image_url: Option<String>,
    price: Money,
    duration_in_days: u32,
    target_role: RoleName,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    pending_events: Vec<RaisedEvent<TierEvent>>,
}

impl Aggregate for SubscriptionTier {
    type Event = TierEvent;

    const AGGREGATE_TYPE: &'static str = "SubscriptionTier";

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn pending_events(&self) -> &[RaisedEvent<TierEvent>] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<RaisedEvent<TierEvent>> {
        std::mem::take(&mut self.pending_events)
    }
}

impl_entity!(SubscriptionTier, "subscription_tiers");

impl SubscriptionTier {
    /// Creates an active tier.
    pub fn create(
        details: TierDetails,
        target_role: RoleName,
        now: DateTime<Utc>,
    ) -> Result<Self, TierError> {
        let details = details.normalized()?;
        let mut tier = Self {
            id: TierId::new(),
            name: details.name,
            description: details.description,
            image_url: details.image_url,
            price: details.price,
            duration_in_days: details.duration_in_days,
            target_role,
            is_active: true,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };
        let event = TierEvent::TierCreated(tier.snapshot());
        tier.record(event, now);
        Ok(tier)
    }

    pub fn id(&self) -> TierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn duration_in_days(&self) -> u32 {
        self.duration_in_days
    }

    pub fn target_role(&self) -> RoleName {
        self.target_role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the editable terms. The target role never changes.
    pub fn update(&mut self, details: TierDetails, now: DateTime<Utc>) -> Result<(), TierError> {
        let details = details.normalized()?;
        self.name = details.name;
        self.description = details.description;
        self.image_url = details.image_url;
        self.price = details.price;
        self.duration_in_days = details.duration_in_days;
        self.updated_at = now;

        let event = TierEvent::TierUpdated(self.snapshot());
        self.record(event, now);
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.updated_at = now;
        let event = TierEvent::TierActivated(self.reference());
        self.record(event, now);
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
        let event = TierEvent::TierDeactivated(self.reference());
        self.record(event, now);
    }

    /// Records the deletion; the caller removes the document.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        let event = TierEvent::TierDeleted(self.reference());
        self.record(event, now);
    }

    fn snapshot(&self) -> TierSnapshotData {
        TierSnapshotData {
            tier_id: self.id,
            name: self.name.clone(),
            price: self.price.clone(),
            duration_in_days: self.duration_in_days,
            target_role: self.target_role,
        }
    }

    fn reference(&self) -> TierRef {
        TierRef {
            tier_id: self.id,
            name: self.name.clone(),
        }
    }

    fn record(&mut self, event: TierEvent, now: DateTime<Utc>) {
        self.pending_events.push(RaisedEvent::new(event, now));
    }
}
