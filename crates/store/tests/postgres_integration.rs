//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    AggregateId, Entity, EventEnvelope, EventLog, EventQuery, Filter, HealthCheck, PostgresStore,
    Repository, RepositoryExt, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE users, roles, subscription_tiers, user_subscriptions, transactions, domain_events",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

/// Minimal document stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Member {
    id: AggregateId,
    email: String,
    role: String,
    #[serde(skip)]
    pending: Vec<String>,
}

impl Member {
    fn new(email: &str, role: &str) -> Self {
        Self {
            id: AggregateId::new(),
            email: email.to_string(),
            role: role.to_string(),
            pending: vec!["UserCreated".to_string()],
        }
    }
}

impl Entity for Member {
    const KIND: &'static str = "User";
    const TABLE: &'static str = "users";

    fn entity_id(&self) -> AggregateId {
        self.id
    }

    fn take_events(&mut self) -> store::Result<Vec<EventEnvelope>> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|event_type| {
                EventEnvelope::builder()
                    .event_type(event_type)
                    .aggregate_id(self.id)
                    .aggregate_type(Self::KIND)
                    .payload_raw(serde_json::json!({"email": self.email}))
                    .build()
            })
            .collect()
    }
}

#[tokio::test]
#[serial]
async fn add_and_get_by_id() {
    let store = get_test_store().await;
    let mut member = Member::new("an@example.com", "Student");

    store.add(&mut member).await.unwrap();

    let loaded: Option<Member> = store.get_by_id(member.id).await.unwrap();
    let loaded = loaded.unwrap();
    assert_eq!(loaded.email, "an@example.com");
    assert!(loaded.pending.is_empty());
}

#[tokio::test]
#[serial]
async fn add_records_events_in_the_same_transaction() {
    let store = get_test_store().await;
    let mut member = Member::new("an@example.com", "Student");

    store.add(&mut member).await.unwrap();

    let events = store.events_for(member.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "UserCreated");
    assert_eq!(events[0].aggregate_type, "User");
}

#[tokio::test]
#[serial]
async fn duplicate_add_is_rejected_without_recording_events() {
    let store = get_test_store().await;
    let mut member = Member::new("an@example.com", "Student");
    store.add(&mut member).await.unwrap();

    member.pending.push("UserCreated".to_string());
    let result = store.add(&mut member).await;
    assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

    let events = store.events_for(member.id).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
#[serial]
async fn update_missing_entity_fails() {
    let store = get_test_store().await;
    let mut member = Member::new("ghost@example.com", "Student");

    let result = store.update(&mut member).await;
    assert!(matches!(result, Err(StoreError::NotFound { kind: "User", .. })));
}

#[tokio::test]
#[serial]
async fn save_inserts_then_replaces() {
    let store = get_test_store().await;
    let mut member = Member::new("an@example.com", "Student");
    store.save(&mut member).await.unwrap();

    member.role = "Teacher".to_string();
    member.pending.push("UserRoleChanged".to_string());
    store.save(&mut member).await.unwrap();

    let all: Vec<Member> = store.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].role, "Teacher");

    let events = store.events_for(member.id).await.unwrap();
    let types: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["UserCreated", "UserRoleChanged"]);
}

#[tokio::test]
#[serial]
async fn find_by_uses_json_containment() {
    let store = get_test_store().await;
    store
        .add(&mut Member::new("a@example.com", "Student"))
        .await
        .unwrap();
    store
        .add(&mut Member::new("b@example.com", "Teacher"))
        .await
        .unwrap();
    store
        .add(&mut Member::new("c@example.com", "Student"))
        .await
        .unwrap();

    let students: Vec<Member> = store
        .find_by(Filter::new().eq("role", "Student"))
        .await
        .unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].email, "a@example.com");

    let admins = RepositoryExt::<Member>::any(&store, Filter::new().eq("role", "Admin"))
        .await
        .unwrap();
    assert!(!admins);
}

#[tokio::test]
#[serial]
async fn delete_keeps_the_event_history() {
    let store = get_test_store().await;
    let mut member = Member::new("an@example.com", "Student");
    store.add(&mut member).await.unwrap();

    member.pending.push("UserDeleted".to_string());
    store.delete(&mut member).await.unwrap();

    assert!(
        !RepositoryExt::<Member>::exists(&store, member.id)
            .await
            .unwrap()
    );
    assert_eq!(store.events_for(member.id).await.unwrap().len(), 2);

    let again = store.delete(&mut member).await;
    assert!(matches!(again, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn query_events_with_limit_and_offset() {
    let store = get_test_store().await;
    for i in 0..5 {
        store
            .add(&mut Member::new(&format!("m{i}@example.com"), "Student"))
            .await
            .unwrap();
    }

    let query = EventQuery::new()
        .aggregate_type("User")
        .event_type("UserCreated")
        .limit(2)
        .offset(1);

    let results = store.query_events(query).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
#[serial]
async fn ping_succeeds_against_live_database() {
    let store = get_test_store().await;
    assert!(store.ping().await.is_ok());
}
