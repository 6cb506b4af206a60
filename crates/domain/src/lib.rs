//! Domain layer for the subscription service.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for event-recording entities
//! - UserSubscription with its lifecycle state machine
//! - SubscriptionTier, Transaction, Role and User aggregates
//! - Money value object
//! - Repository extension traits with domain-specific lookups

pub mod aggregate;
pub mod error;
pub mod repository;
pub mod shared;
pub mod subscription;
pub mod tier;
pub mod transaction;
pub mod user;

pub use aggregate::{Aggregate, DomainEvent, RaisedEvent};
pub use error::DomainError;
pub use repository::{
    RoleRepositoryExt, SubscriptionRepositoryExt, TierRepositoryExt, TransactionRepositoryExt, UserRepositoryExt,
};
pub use shared::{Currency, Money, MoneyError};
pub use subscription::{SubscriptionError, SubscriptionEvent, SubscriptionStatus, UserSubscription};
pub use tier::{SubscriptionTier, TierDetails, TierError, TierEvent};
pub use transaction::{PaymentProvider, PaymentStatus, Transaction, TransactionError, TransactionEvent};
pub use user::{Role, RoleEvent, RoleName, User, UserError, UserEvent};
