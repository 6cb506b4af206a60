//! The repositories the handlers work against.

use std::sync::Arc;

use domain::{Role, SubscriptionTier, Transaction, User, UserSubscription};
use store::{EventLog, HealthCheck, InMemoryStore, Repository};

/// One repository per aggregate plus the event log and a health check.
///
/// Every member usually points at the same backend; they are kept separate
/// so handlers only see the collections they need.
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: Arc<dyn Repository<UserSubscription>>,
    pub tiers: Arc<dyn Repository<SubscriptionTier>>,
    pub transactions: Arc<dyn Repository<Transaction>>,
    pub roles: Arc<dyn Repository<Role>>,
    pub users: Arc<dyn Repository<User>>,
    pub events: Arc<dyn EventLog>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    /// Uses one store for every collection.
    pub fn from_store<S>(store: S) -> Self
    where
        S: Repository<UserSubscription>
            + Repository<SubscriptionTier>
            + Repository<Transaction>
            + Repository<Role>
            + Repository<User>
            + EventLog
            + HealthCheck
            + Clone
            + 'static,
    {
        Self {
            subscriptions: Arc::new(store.clone()),
            tiers: Arc::new(store.clone()),
            transactions: Arc::new(store.clone()),
            roles: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            health: Arc::new(store),
        }
    }

    /// A fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }
}
