//! Transaction queries.

use std::collections::HashMap;

use async_trait::async_trait;
use common::{SubscriptionId, TransactionId, UserId};
use domain::{
    PaymentProvider, PaymentStatus, SubscriptionRepositoryExt, Transaction,
    TransactionRepositoryExt,
};

use crate::dto::{TransactionDto, UNKNOWN_PLAN};
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

use super::plan_names;

/// All transactions, optionally filtered. An unknown status or provider
/// matches nothing.
#[derive(Debug, Clone, Default)]
pub struct GetAllTransactions {
    pub payment_status: Option<String>,
    pub payment_provider: Option<String>,
}

impl Request for GetAllTransactions {
    type Response = Vec<TransactionDto>;
}

#[derive(Debug, Clone)]
pub struct GetTransactionById {
    pub id: TransactionId,
}

impl Request for GetTransactionById {
    type Response = Option<TransactionDto>;
}

/// Every transaction paying for one of the user's subscriptions, newest first.
#[derive(Debug, Clone)]
pub struct GetUserTransactions {
    pub user_id: UserId,
}

impl Request for GetUserTransactions {
    type Response = Vec<TransactionDto>;
}

#[derive(Clone)]
pub struct TransactionQueries {
    repos: Repositories,
}

impl TransactionQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Tier name per subscription id.
    async fn plans_by_subscription(&self) -> Result<HashMap<SubscriptionId, String>> {
        let names = plan_names(&self.repos).await?;
        Ok(self
            .repos
            .subscriptions
            .list()
            .await?
            .iter()
            .filter_map(|subscription| {
                names
                    .get(&subscription.tier_id())
                    .map(|name| (subscription.id(), name.clone()))
            })
            .collect())
    }

    fn to_dtos(
        transactions: &[Transaction],
        plans: &HashMap<SubscriptionId, String>,
    ) -> Vec<TransactionDto> {
        transactions
            .iter()
            .map(|transaction| {
                let plan = plans
                    .get(&transaction.user_subscription_id())
                    .map_or(UNKNOWN_PLAN, String::as_str);
                TransactionDto::from_transaction(transaction, plan)
            })
            .collect()
    }
}

fn parse_filter<T: std::str::FromStr>(value: Option<&str>) -> Option<Option<T>> {
    match value.map(str::trim) {
        None | Some("") => Some(None),
        Some(value) => value.parse().ok().map(Some),
    }
}

#[async_trait]
impl Handler<GetAllTransactions> for TransactionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: GetAllTransactions) -> Result<Vec<TransactionDto>> {
        let Some(status) = parse_filter::<PaymentStatus>(request.payment_status.as_deref()) else {
            return Ok(Vec::new());
        };
        let Some(provider) = parse_filter::<PaymentProvider>(request.payment_provider.as_deref())
        else {
            return Ok(Vec::new());
        };

        let transactions = self
            .repos
            .transactions
            .find_filtered(status, provider)
            .await?;
        let plans = self.plans_by_subscription().await?;
        Ok(Self::to_dtos(&transactions, &plans))
    }
}

#[async_trait]
impl Handler<GetTransactionById> for TransactionQueries {
    async fn handle(&self, request: GetTransactionById) -> Result<Option<TransactionDto>> {
        let Some(transaction) = self.repos.transactions.get_by_id(request.id.into()).await?
        else {
            return Ok(None);
        };
        let plans = self.plans_by_subscription().await?;
        Ok(Self::to_dtos(&[transaction], &plans).pop())
    }
}

#[async_trait]
impl Handler<GetUserTransactions> for TransactionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: GetUserTransactions) -> Result<Vec<TransactionDto>> {
        let subscriptions = self
            .repos
            .subscriptions
            .find_by_user(request.user_id)
            .await?;
        if subscriptions.is_empty() {
            return Ok(Vec::new());
        }

        let names = plan_names(&self.repos).await?;
        let mut plans = HashMap::new();
        let mut transactions = Vec::new();
        for subscription in &subscriptions {
            let name = names
                .get(&subscription.tier_id())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PLAN.to_string());
            plans.insert(subscription.id(), name);
            transactions.extend(
                self.repos
                    .transactions
                    .find_by_subscription(subscription.id())
                    .await?,
            );
        }
        transactions.sort_by_key(|transaction| std::cmp::Reverse(transaction.created_at()));

        Ok(Self::to_dtos(&transactions, &plans))
    }
}
