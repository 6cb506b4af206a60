//! Commands: requests that change state and answer with an `Outcome`.

pub mod subscriptions;
pub mod tiers;
pub mod transactions;
pub mod users;

pub use subscriptions::{
    ActivateSubscription, CancelSubscription, DeleteSubscription, ExpireSubscription,
    RenewSubscription, SubscribeResult, SubscribeToPro, SubscribeToTier, SubscriptionCommands,
    SuspendSubscription,
};
pub use tiers::{
    ActivateSubscriptionTier, CreateSubscriptionTier, DeactivateSubscriptionTier,
    DeleteSubscriptionTier, TierCommands, UpdateSubscriptionTier,
};
pub use transactions::{TransactionCommands, UpdateTransactionStatus};
pub use users::{ChangeUserRole, CreateRole, CreateUser, DeleteRole, UserCommands};
