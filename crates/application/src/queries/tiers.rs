//! Subscription tier queries.

use async_trait::async_trait;
use common::TierId;
use domain::TierRepositoryExt;

use crate::dto::SubscriptionTierDto;
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

/// Tiers offered to users.
#[derive(Debug, Clone)]
pub struct GetActiveTiers;

impl Request for GetActiveTiers {
    type Response = Vec<SubscriptionTierDto>;
}

#[derive(Debug, Clone)]
pub struct GetAllTiers {
    pub include_inactive: bool,
}

impl Request for GetAllTiers {
    type Response = Vec<SubscriptionTierDto>;
}

#[derive(Debug, Clone)]
pub struct GetTierById {
    pub id: TierId,
}

impl Request for GetTierById {
    type Response = Option<SubscriptionTierDto>;
}

#[derive(Clone)]
pub struct TierQueries {
    repos: Repositories,
}

impl TierQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Handler<GetActiveTiers> for TierQueries {
    async fn handle(&self, _request: GetActiveTiers) -> Result<Vec<SubscriptionTierDto>> {
        let tiers = self.repos.tiers.find_active().await?;
        Ok(tiers.iter().map(SubscriptionTierDto::from).collect())
    }
}

#[async_trait]
impl Handler<GetAllTiers> for TierQueries {
    async fn handle(&self, request: GetAllTiers) -> Result<Vec<SubscriptionTierDto>> {
        let tiers = if request.include_inactive {
            self.repos.tiers.list().await?
        } else {
            self.repos.tiers.find_active().await?
        };
        Ok(tiers.iter().map(SubscriptionTierDto::from).collect())
    }
}

#[async_trait]
impl Handler<GetTierById> for TierQueries {
    async fn handle(&self, request: GetTierById) -> Result<Option<SubscriptionTierDto>> {
        let tier = self.repos.tiers.get_by_id(request.id.into()).await?;
        Ok(tier.as_ref().map(SubscriptionTierDto::from))
    }
}
