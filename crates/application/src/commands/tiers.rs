//! Subscription tier commands.

use async_trait::async_trait;
use chrono::Utc;
use common::{Outcome, TierId};
use domain::{SubscriptionRepositoryExt, SubscriptionTier, TierRepositoryExt};

use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;
use crate::validation::{TierInput, validate_target_role, validate_tier};

pub(crate) const TIER_NOT_FOUND: &str = "Subscription tier not found";

fn duplicate_name(name: &str) -> String {
    format!("Subscription tier with name '{}' already exists", name.trim())
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionTier {
    pub tier: TierInput,
    pub target_role: String,
}

impl Request for CreateSubscriptionTier {
    type Response = Outcome<TierId>;
}

/// Replaces a tier's terms. The target role cannot be changed.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionTier {
    pub id: TierId,
    pub tier: TierInput,
}

impl Request for UpdateSubscriptionTier {
    type Response = Outcome;
}

/// Deletes a tier nobody is subscribed to.
#[derive(Debug, Clone)]
pub struct DeleteSubscriptionTier {
    pub id: TierId,
}

impl Request for DeleteSubscriptionTier {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct ActivateSubscriptionTier {
    pub id: TierId,
}

impl Request for ActivateSubscriptionTier {
    type Response = Outcome;
}

#[derive(Debug, Clone)]
pub struct DeactivateSubscriptionTier {
    pub id: TierId,
}

impl Request for DeactivateSubscriptionTier {
    type Response = Outcome;
}

#[derive(Clone)]
pub struct TierCommands {
    repos: Repositories,
}

impl TierCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn load(&self, id: TierId) -> Result<Option<SubscriptionTier>> {
        Ok(self.repos.tiers.get_by_id(id.into()).await?)
    }
}

#[async_trait]
impl Handler<CreateSubscriptionTier> for TierCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: CreateSubscriptionTier) -> Result<Outcome<TierId>> {
        let details = match validate_tier(&request.tier) {
            Ok(details) => details,
            Err(failure) => return Ok(Outcome::Failure(failure)),
        };
        let target_role = match validate_target_role(&request.target_role) {
            Ok(role) => role,
            Err(failure) => return Ok(Outcome::Failure(failure)),
        };
        if self.repos.tiers.find_by_name(&details.name).await?.is_some() {
            return Ok(Outcome::failure(duplicate_name(&details.name)));
        }

        let mut tier = match SubscriptionTier::create(details, target_role, Utc::now()) {
            Ok(tier) => tier,
            Err(err) => return Ok(Outcome::failure(err.to_string())),
        };
        self.repos.tiers.add(&mut tier).await?;

        tracing::info!(tier_id = %tier.id(), name = tier.name(), "subscription tier created");
        Ok(Outcome::success(tier.id()))
    }
}

#[async_trait]
impl Handler<UpdateSubscriptionTier> for TierCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: UpdateSubscriptionTier) -> Result<Outcome> {
        let details = match validate_tier(&request.tier) {
            Ok(details) => details,
            Err(failure) => return Ok(Outcome::Failure(failure)),
        };
        let Some(mut tier) = self.load(request.id).await? else {
            return Ok(Outcome::not_found(TIER_NOT_FOUND));
        };
        if tier.name() != details.name {
            let taken = self
                .repos
                .tiers
                .find_by_name(&details.name)
                .await?
                .is_some_and(|existing| existing.id() != request.id);
            if taken {
                return Ok(Outcome::failure(duplicate_name(&details.name)));
            }
        }

        if let Err(err) = tier.update(details, Utc::now()) {
            return Ok(Outcome::failure(err.to_string()));
        }
        self.repos.tiers.update(&mut tier).await?;
        Ok(Outcome::ok())
    }
}

#[async_trait]
impl Handler<DeleteSubscriptionTier> for TierCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: DeleteSubscriptionTier) -> Result<Outcome> {
        let Some(mut tier) = self.load(request.id).await? else {
            return Ok(Outcome::not_found(TIER_NOT_FOUND));
        };
        if self.repos.subscriptions.has_live_for_tier(request.id).await? {
            return Ok(Outcome::failure(
                "Cannot delete subscription tier that has active subscriptions",
            ));
        }

        tier.mark_deleted(Utc::now());
        self.repos.tiers.delete(&mut tier).await?;
        tracing::info!(tier_id = %request.id, "subscription tier deleted");
        Ok(Outcome::ok())
    }
}

#[async_trait]
impl Handler<ActivateSubscriptionTier> for TierCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: ActivateSubscriptionTier) -> Result<Outcome> {
        let Some(mut tier) = self.load(request.id).await? else {
            return Ok(Outcome::not_found(TIER_NOT_FOUND));
        };
        tier.activate(Utc::now());
        self.repos.tiers.update(&mut tier).await?;
        Ok(Outcome::ok())
    }
}

#[async_trait]
impl Handler<DeactivateSubscriptionTier> for TierCommands {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: DeactivateSubscriptionTier) -> Result<Outcome> {
        let Some(mut tier) = self.load(request.id).await? else {
            return Ok(Outcome::not_found(TIER_NOT_FOUND));
        };
        tier.deactivate(Utc::now());
        self.repos.tiers.update(&mut tier).await?;
        Ok(Outcome::ok())
    }
}
