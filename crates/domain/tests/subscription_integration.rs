//! Integration tests for the domain aggregates persisted through a repository.
//!
//! These tests verify lifecycle transitions, event recording and the
//! domain-specific repository lookups against the in-memory backend.

use chrono::{Duration, Utc};
use common::{TierId, UserId};
use domain::{
    Aggregate, Money, PaymentProvider, PaymentStatus, Role, RoleName, SubscriptionError,
    SubscriptionRepositoryExt, SubscriptionStatus, SubscriptionTier, TierDetails, Transaction,
    TransactionRepositoryExt, User, UserRepositoryExt, UserSubscription,
};
use store::{EventLog, EventQuery, InMemoryStore, Repository};

fn pro_details() -> TierDetails {
    TierDetails {
        name: "Pro".to_string(),
        description: "Full access to every course".to_string(),
        image_url: Some("https://cdn.example.com/pro.png".to_string()),
        price: Money::vnd(199_000).unwrap(),
        duration_in_days: 30,
    }
}

mod subscription_lifecycle {
    use super::*;

    #[tokio::test]
    async fn pending_activate_suspend_reactivate_cancel() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let user_id = UserId::new();

        let mut subscription =
            UserSubscription::pending_for_days(user_id, TierId::new(), 30, now).unwrap();
        let id = subscription.id();
        store.add(&mut subscription).await.unwrap();

        let mut loaded: UserSubscription = store.get_by_id(id.into()).await.unwrap().unwrap();
        assert_eq!(loaded.status(), SubscriptionStatus::Pending);
        loaded.activate(now).unwrap();
        store.update(&mut loaded).await.unwrap();

        let mut loaded: UserSubscription = store.get_by_id(id.into()).await.unwrap().unwrap();
        loaded.suspend(now).unwrap();
        loaded.activate(now).unwrap();
        loaded.cancel(now).unwrap();
        store.update(&mut loaded).await.unwrap();

        let events = store.events_for(id.into()).await.unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "SubscriptionCreated",
                "SubscriptionActivated",
                "SubscriptionSuspended",
                "SubscriptionActivated",
                "SubscriptionCancelled",
            ]
        );
        assert!(events.iter().all(|e| e.aggregate_type == "UserSubscription"));
    }

    #[tokio::test]
    async fn rejected_transition_leaves_store_untouched() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut subscription = UserSubscription::create_active(
            UserId::new(),
            TierId::new(),
            now,
            now + Duration::days(30),
            now,
        )
        .unwrap();
        let id = subscription.id();
        store.add(&mut subscription).await.unwrap();

        let mut loaded: UserSubscription = store.get_by_id(id.into()).await.unwrap().unwrap();
        assert_eq!(loaded.activate(now), Err(SubscriptionError::AlreadyActive));
        assert!(loaded.pending_events().is_empty());

        assert_eq!(store.events_for(id.into()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_records_event_after_document_is_gone() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut subscription =
            UserSubscription::pending_for_days(UserId::new(), TierId::new(), 7, now).unwrap();
        let id = subscription.id();
        store.add(&mut subscription).await.unwrap();

        subscription.mark_deleted(now);
        store.delete(&mut subscription).await.unwrap();

        let gone: Option<UserSubscription> = store.get_by_id(id.into()).await.unwrap();
        assert!(gone.is_none());
        let deleted = store
            .query_events(EventQuery::new().event_types(vec!["SubscriptionDeleted".to_string()]))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].payload["data"]["status"], "Pending");
    }
}

mod payments {
    use super::*;

    #[tokio::test]
    async fn paid_transaction_is_found_by_subscription() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut tier = SubscriptionTier::create(pro_details(), RoleName::Student, now).unwrap();
        store.add(&mut tier).await.unwrap();

        let mut subscription =
            UserSubscription::pending_for_days(UserId::new(), tier.id(), tier.duration_in_days(), now)
                .unwrap();
        store.add(&mut subscription).await.unwrap();

        let code = Transaction::generate_code(now);
        let mut transaction = Transaction::create(
            &code,
            tier.price().clone(),
            PaymentProvider::Momo,
            subscription.id(),
            now,
        )
        .unwrap();
        store.add(&mut transaction).await.unwrap();

        transaction
            .update_status(PaymentStatus::Paid, Some("MOMO-1".to_string()), now)
            .unwrap();
        store.update(&mut transaction).await.unwrap();

        let found = store.find_by_subscription(subscription.id()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].payment_status(), PaymentStatus::Paid);
        assert_eq!(store.find_by_code(&code).await.unwrap().unwrap().id(), transaction.id());

        let paid = store
            .find_filtered(Some(PaymentStatus::Paid), Some(PaymentProvider::Momo))
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        let stripe = store
            .find_filtered(None, Some(PaymentProvider::Stripe))
            .await
            .unwrap();
        assert!(stripe.is_empty());
    }
}

mod users_and_roles {
    use super::*;

    #[tokio::test]
    async fn role_assignment_lookup() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut student = Role::create(RoleName::Student, None, now).unwrap();
        let mut teacher = Role::create(RoleName::Teacher, None, now).unwrap();
        store.add(&mut student).await.unwrap();
        store.add(&mut teacher).await.unwrap();

        let mut user = User::create("lan@example.com", "Lan", "Tran", student.id(), now).unwrap();
        store.add(&mut user).await.unwrap();

        assert!(store.any_with_role(student.id()).await.unwrap());
        assert!(!store.any_with_role(teacher.id()).await.unwrap());

        user.change_role(teacher.id(), now);
        store.update(&mut user).await.unwrap();
        assert!(!store.any_with_role(student.id()).await.unwrap());
        assert!(store.any_with_role(teacher.id()).await.unwrap());

        let found = store.find_by_email("LAN@example.com").await.unwrap().unwrap();
        assert_eq!(found.id(), user.id());
    }

    #[tokio::test]
    async fn cancelled_subscription_is_no_longer_active() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let now = Utc::now();

        let mut subscription =
            UserSubscription::pending_for_days(user_id, TierId::new(), 30, now).unwrap();
        subscription.activate(now).unwrap();
        store.add(&mut subscription).await.unwrap();
        assert!(store.active_for_user(user_id).await.unwrap().is_some());

        subscription.cancel(now).unwrap();
        store.update(&mut subscription).await.unwrap();
        assert!(store.active_for_user(user_id).await.unwrap().is_none());
        assert_eq!(
            store
                .find_by_status(SubscriptionStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
