//! Queries: read-only requests. A missing entity is `None` or an empty list,
//! never an error.

pub mod events;
pub mod health;
pub mod subscriptions;
pub mod tiers;
pub mod transactions;
pub mod users;

pub use events::{EventQueries, GetDomainEvents, GetSubscriptionHistory};
pub use health::{CheckDatabaseHealth, HealthQueries};
pub use subscriptions::{
    GetAllSubscriptions, GetCurrentSubscription, GetDashboardStats, GetSubscriptionById,
    GetSubscriptionClaims, SubscriptionQueries,
};
pub use tiers::{GetActiveTiers, GetAllTiers, GetTierById, TierQueries};
pub use transactions::{
    GetAllTransactions, GetTransactionById, GetUserTransactions, TransactionQueries,
};
pub use users::{GetRoleById, GetRoles, GetUserById, UserQueries};

use std::collections::HashMap;

use common::TierId;

use crate::error::Result;
use crate::repositories::Repositories;

/// Tier names keyed by id, for labelling subscriptions and transactions.
pub(crate) async fn plan_names(repos: &Repositories) -> Result<HashMap<TierId, String>> {
    Ok(repos
        .tiers
        .list()
        .await?
        .iter()
        .map(|tier| (tier.id(), tier.name().to_string()))
        .collect())
}
