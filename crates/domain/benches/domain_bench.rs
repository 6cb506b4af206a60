use chrono::{Duration, Utc};
use common::{SubscriptionId, TierId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Aggregate, Money, PaymentProvider, PaymentStatus, SubscriptionRepositoryExt, Transaction,
    UserSubscription,
};
use store::{InMemoryStore, Repository};

fn bench_subscription_lifecycle(c: &mut Criterion) {
    c.bench_function("domain/subscription_lifecycle", |b| {
        b.iter(|| {
            let now = Utc::now();
            let mut subscription =
                UserSubscription::pending_for_days(UserId::new(), TierId::new(), 30, now).unwrap();
            subscription.activate(now).unwrap();
            subscription.suspend(now).unwrap();
            subscription.activate(now).unwrap();
            subscription
                .renew(subscription.end_date() + Duration::days(30), now)
                .unwrap();
            subscription.cancel(now).unwrap();
            subscription.drain_envelopes().unwrap()
        });
    });
}

fn bench_payment_status(c: &mut Criterion) {
    c.bench_function("domain/transaction_fail_then_pay", |b| {
        b.iter(|| {
            let now = Utc::now();
            let mut transaction = Transaction::create(
                &Transaction::generate_code(now),
                Money::vnd(199_000).unwrap(),
                PaymentProvider::VnPay,
                SubscriptionId::new(),
                now,
            )
            .unwrap();
            transaction
                .update_status(PaymentStatus::Failed, None, now)
                .unwrap();
            transaction
                .update_status(PaymentStatus::Paid, Some("VNP-1".to_string()), now)
                .unwrap();
            transaction.drain_envelopes().unwrap()
        });
    });
}

fn bench_current_subscription_lookup(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let user_id = UserId::new();
    let now = Utc::now();

    // Pre-populate: 10 active subscriptions for the user among 500 others
    rt.block_on(async {
        for i in 0..510 {
            let owner = if i % 51 == 0 { user_id } else { UserId::new() };
            let start = now - Duration::days(i);
            let mut subscription =
                UserSubscription::pending_for_days(owner, TierId::new(), 30, start).unwrap();
            subscription.activate(start).unwrap();
            Repository::<UserSubscription>::add(&store, &mut subscription)
                .await
                .unwrap();
        }
    });

    c.bench_function("domain/active_subscription_among_510", |b| {
        b.iter(|| {
            rt.block_on(async { store.active_for_user(user_id).await.unwrap() });
        });
    });
}

criterion_group!(
    benches,
    bench_subscription_lifecycle,
    bench_payment_status,
    bench_current_subscription_lookup,
);
criterion_main!(benches);
