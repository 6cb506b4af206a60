//! Wires every command and query to its handler.

use crate::commands::{
    ActivateSubscription, ActivateSubscriptionTier, CancelSubscription, ChangeUserRole,
    CreateRole, CreateSubscriptionTier, CreateUser, DeactivateSubscriptionTier, DeleteRole,
    DeleteSubscription, DeleteSubscriptionTier, ExpireSubscription, RenewSubscription,
    SubscribeToPro, SubscribeToTier, SubscriptionCommands, SuspendSubscription, TierCommands,
    TransactionCommands, UpdateSubscriptionTier, UpdateTransactionStatus, UserCommands,
};
use crate::error::Result;
use crate::mediator::Mediator;
use crate::queries::{
    CheckDatabaseHealth, EventQueries, GetActiveTiers, GetAllSubscriptions, GetAllTiers,
    GetAllTransactions, GetCurrentSubscription, GetDashboardStats, GetDomainEvents, GetRoleById,
    GetRoles, GetSubscriptionById, GetSubscriptionClaims, GetSubscriptionHistory, GetTierById,
    GetTransactionById, GetUserById, GetUserTransactions, HealthQueries, SubscriptionQueries,
    TierQueries, TransactionQueries, UserQueries,
};
use crate::repositories::Repositories;

/// Builds a mediator with a handler for every request this crate defines.
pub fn build_mediator(repos: Repositories) -> Result<Mediator> {
    let subscription_commands = SubscriptionCommands::new(repos.clone());
    let tier_commands = TierCommands::new(repos.clone());
    let user_commands = UserCommands::new(repos.clone());
    let subscription_queries = SubscriptionQueries::new(repos.clone());
    let tier_queries = TierQueries::new(repos.clone());
    let transaction_queries = TransactionQueries::new(repos.clone());
    let user_queries = UserQueries::new(repos.clone());
    let event_queries = EventQueries::new(repos.clone());

    Mediator::builder()
        // Subscription commands
        .register::<SubscribeToTier, _>(subscription_commands.clone())
        .register::<SubscribeToPro, _>(subscription_commands.clone())
        .register::<CancelSubscription, _>(subscription_commands.clone())
        .register::<ActivateSubscription, _>(subscription_commands.clone())
        .register::<SuspendSubscription, _>(subscription_commands.clone())
        .register::<RenewSubscription, _>(subscription_commands.clone())
        .register::<ExpireSubscription, _>(subscription_commands.clone())
        .register::<DeleteSubscription, _>(subscription_commands)
        // Tier commands
        .register::<CreateSubscriptionTier, _>(tier_commands.clone())
        .register::<UpdateSubscriptionTier, _>(tier_commands.clone())
        .register::<DeleteSubscriptionTier, _>(tier_commands.clone())
        .register::<ActivateSubscriptionTier, _>(tier_commands.clone())
        .register::<DeactivateSubscriptionTier, _>(tier_commands)
        // Transaction commands
        .register::<UpdateTransactionStatus, _>(TransactionCommands::new(repos.clone()))
        // User and role commands
        .register::<CreateRole, _>(user_commands.clone())
        .register::<DeleteRole, _>(user_commands.clone())
        .register::<CreateUser, _>(user_commands.clone())
        .register::<ChangeUserRole, _>(user_commands)
        // Queries
        .register::<GetCurrentSubscription, _>(subscription_queries.clone())
        .register::<GetSubscriptionById, _>(subscription_queries.clone())
        .register::<GetAllSubscriptions, _>(subscription_queries.clone())
        .register::<GetSubscriptionClaims, _>(subscription_queries.clone())
        .register::<GetDashboardStats, _>(subscription_queries)
        .register::<GetActiveTiers, _>(tier_queries.clone())
        .register::<GetAllTiers, _>(tier_queries.clone())
        .register::<GetTierById, _>(tier_queries)
        .register::<GetAllTransactions, _>(transaction_queries.clone())
        .register::<GetTransactionById, _>(transaction_queries.clone())
        .register::<GetUserTransactions, _>(transaction_queries)
        .register::<GetRoles, _>(user_queries.clone())
        .register::<GetRoleById, _>(user_queries.clone())
        .register::<GetUserById, _>(user_queries)
        .register::<GetSubscriptionHistory, _>(event_queries.clone())
        .register::<GetDomainEvents, _>(event_queries)
        .register::<CheckDatabaseHealth, _>(HealthQueries::new(repos))
        .build()
}
