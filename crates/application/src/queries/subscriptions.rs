//! Subscription queries, claims and the admin dashboard.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Months, NaiveTime, Utc};
use common::{SubscriptionId, UserId};
use domain::{
    PaymentStatus, SubscriptionRepositoryExt, SubscriptionStatus, Transaction, UserSubscription,
};

use crate::dto::{
    DashboardStatsDto, MonthlyRevenueItem, SubscriptionClaimsDto, SubscriptionStatusItem,
    UNKNOWN_PLAN, UserSubscriptionDto,
};
use crate::error::Result;
use crate::mediator::{Handler, Request};
use crate::repositories::Repositories;

use super::plan_names;

const REVENUE_MONTHS: u32 = 6;

/// The user's active subscription, if any.
#[derive(Debug, Clone)]
pub struct GetCurrentSubscription {
    pub user_id: UserId,
}

impl Request for GetCurrentSubscription {
    type Response = Option<UserSubscriptionDto>;
}

#[derive(Debug, Clone)]
pub struct GetSubscriptionById {
    pub id: SubscriptionId,
}

impl Request for GetSubscriptionById {
    type Response = Option<UserSubscriptionDto>;
}

/// All subscriptions, optionally only those with the given status.
/// An unknown status matches nothing.
#[derive(Debug, Clone, Default)]
pub struct GetAllSubscriptions {
    pub status: Option<String>,
}

impl Request for GetAllSubscriptions {
    type Response = Vec<UserSubscriptionDto>;
}

#[derive(Debug, Clone)]
pub struct GetSubscriptionClaims {
    pub user_id: UserId,
}

impl Request for GetSubscriptionClaims {
    type Response = SubscriptionClaimsDto;
}

#[derive(Debug, Clone)]
pub struct GetDashboardStats;

impl Request for GetDashboardStats {
    type Response = DashboardStatsDto;
}

#[derive(Clone)]
pub struct SubscriptionQueries {
    repos: Repositories,
}

impl SubscriptionQueries {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn to_dto(&self, subscription: &UserSubscription) -> Result<UserSubscriptionDto> {
        let plan_name = self
            .repos
            .tiers
            .get_by_id(subscription.tier_id().into())
            .await?
            .map_or_else(|| UNKNOWN_PLAN.to_string(), |tier| tier.name().to_string());
        Ok(UserSubscriptionDto::from_subscription(
            subscription,
            plan_name,
            Utc::now(),
        ))
    }
}

#[async_trait]
impl Handler<GetCurrentSubscription> for SubscriptionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: GetCurrentSubscription) -> Result<Option<UserSubscriptionDto>> {
        match self
            .repos
            .subscriptions
            .active_for_user(request.user_id)
            .await?
        {
            Some(subscription) => Ok(Some(self.to_dto(&subscription).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Handler<GetSubscriptionById> for SubscriptionQueries {
    async fn handle(&self, request: GetSubscriptionById) -> Result<Option<UserSubscriptionDto>> {
        match self.repos.subscriptions.get_by_id(request.id.into()).await? {
            Some(subscription) => Ok(Some(self.to_dto(&subscription).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Handler<GetAllSubscriptions> for SubscriptionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: GetAllSubscriptions) -> Result<Vec<UserSubscriptionDto>> {
        let subscriptions = match request.status.as_deref().map(str::trim) {
            None | Some("") => self.repos.subscriptions.list().await?,
            Some(status) => match status.parse::<SubscriptionStatus>() {
                Ok(status) => self.repos.subscriptions.find_by_status(status).await?,
                Err(_) => return Ok(Vec::new()),
            },
        };

        let names = plan_names(&self.repos).await?;
        let now = Utc::now();
        Ok(subscriptions
            .iter()
            .map(|subscription| {
                let plan_name = names
                    .get(&subscription.tier_id())
                    .map_or(UNKNOWN_PLAN, String::as_str);
                UserSubscriptionDto::from_subscription(subscription, plan_name, now)
            })
            .collect())
    }
}

#[async_trait]
impl Handler<GetSubscriptionClaims> for SubscriptionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: GetSubscriptionClaims) -> Result<SubscriptionClaimsDto> {
        let now = Utc::now();
        let subscription = self
            .repos
            .subscriptions
            .active_for_user(request.user_id)
            .await?
            .filter(|subscription| subscription.is_active_at(now));
        let Some(subscription) = subscription else {
            return Ok(SubscriptionClaimsDto::free(request.user_id));
        };

        let plan = self
            .repos
            .tiers
            .get_by_id(subscription.tier_id().into())
            .await?
            .map_or_else(|| "free".to_string(), |tier| tier.name().to_lowercase());
        Ok(SubscriptionClaimsDto {
            user_id: request.user_id,
            plan,
            expires_at: subscription.expires_at_timestamp(),
            has_active_subscription: true,
        })
    }
}

#[async_trait]
impl Handler<GetDashboardStats> for SubscriptionQueries {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, _request: GetDashboardStats) -> Result<DashboardStatsDto> {
        let subscriptions = self.repos.subscriptions.list().await?;
        let transactions = self.repos.transactions.list().await?;

        let paid: Vec<_> = transactions
            .iter()
            .filter(|transaction| transaction.payment_status() == PaymentStatus::Paid)
            .collect();
        let total_revenue = revenue(&paid);

        let total = subscriptions.len();
        let count = |status: SubscriptionStatus| {
            subscriptions
                .iter()
                .filter(|subscription| subscription.status() == status)
                .count()
        };
        let active = count(SubscriptionStatus::Active);
        let expired = count(SubscriptionStatus::Expired);
        let cancelled = count(SubscriptionStatus::Cancelled);
        let suspended = count(SubscriptionStatus::Suspended);

        let status_distribution = [
            (SubscriptionStatus::Active, active),
            (SubscriptionStatus::Expired, expired),
            (SubscriptionStatus::Cancelled, cancelled),
            (SubscriptionStatus::Suspended, suspended),
        ]
        .into_iter()
        .map(|(status, count)| SubscriptionStatusItem {
            status: status.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

        let monthly_revenue = month_windows(Utc::now(), REVENUE_MONTHS)
            .into_iter()
            .map(|(month, start, end)| {
                let in_month: Vec<&Transaction> = paid
                    .iter()
                    .copied()
                    .filter(|t| t.created_at() >= start && t.created_at() < end)
                    .collect();
                MonthlyRevenueItem {
                    month,
                    revenue: revenue(&in_month),
                    transaction_count: in_month.len(),
                }
            })
            .collect();

        tracing::info!(
            total_subscriptions = total,
            total_revenue,
            "dashboard stats computed"
        );

        Ok(DashboardStatsDto {
            total_revenue,
            total_subscriptions: total,
            active_subscriptions: active,
            expired_subscriptions: expired,
            cancelled_subscriptions: cancelled,
            suspended_subscriptions: suspended,
            monthly_revenue,
            status_distribution,
        })
    }
}

/// Sum of the amounts, saturating at `i64::MAX` instead of wrapping.
fn revenue(transactions: &[&Transaction]) -> i64 {
    transactions
        .iter()
        .map(|t| t.amount().amount())
        .fold(0, i64::saturating_add)
}

/// `part` as a percentage of `total`, rounded to one decimal; 0 when `total` is 0.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

/// The last `count` calendar months up to and including the one `now` is in,
/// oldest first, as `(label, start, end)` with `end` exclusive.
fn month_windows(now: DateTime<Utc>, count: u32) -> Vec<(String, DateTime<Utc>, DateTime<Utc>)> {
    let Some(current) = now.date_naive().with_day(1) else {
        return Vec::new();
    };
    (0..count)
        .rev()
        .filter_map(|back| {
            let start = current.checked_sub_months(Months::new(back))?;
            let end = start.checked_add_months(Months::new(1))?;
            Some((
                start.format("%b %Y").to_string(),
                start.and_time(NaiveTime::MIN).and_utc(),
                end.and_time(NaiveTime::MIN).and_utc(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn month_windows_cover_six_months_across_a_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        let windows = month_windows(now, 6);

        let labels: Vec<&str> = windows.iter().map(|(label, _, _)| label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]
        );
        assert_eq!(windows[5].1, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[5].2, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[3].2, windows[4].1);
    }

    #[test]
    fn revenue_saturates_instead_of_overflowing() {
        let now = Utc::now();
        let transaction = |amount| {
            Transaction::create(
                &Transaction::generate_code(now),
                domain::Money::vnd(amount).unwrap(),
                domain::PaymentProvider::VnPay,
                SubscriptionId::new(),
                now,
            )
            .unwrap()
        };
        let small = [transaction(100), transaction(250)];
        assert_eq!(revenue(&small.iter().collect::<Vec<_>>()), 350);

        let huge = [transaction(i64::MAX), transaction(i64::MAX)];
        assert_eq!(revenue(&huge.iter().collect::<Vec<_>>()), i64::MAX);
        assert_eq!(revenue(&[]), 0);
    }
}
