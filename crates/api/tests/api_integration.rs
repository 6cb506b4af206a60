//! Integration tests for the API server.

use std::sync::OnceLock;

use api::AppState;
use application::Repositories;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::UserId;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let state = AppState::new(Repositories::in_memory()).unwrap();
    api::create_app(state, get_metrics_handle())
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<UserId>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_tier(app: &Router, name: &str) -> String {
    let (status, json) = call(
        app,
        "POST",
        "/admin/tiers",
        None,
        Some(json!({
            "name": name,
            "description": format!("{name} plan"),
            "price": 199000,
            "currency": "VND",
            "duration_in_days": 30,
            "target_role": "Student"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_database_health() {
    let app = setup();
    let (status, json) = call(&app, "GET", "/health/database", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isHealthy"], true);
    assert_eq!(json["status"], "Healthy");
    assert!(json["responseTimeMs"].is_u64());
    assert!(json["timestamp"].is_string());
    assert!(json.get("error").is_none());
    assert!(json.get("is_healthy").is_none());
    assert!(json.get("response_time_ms").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    call(&app, "GET", "/tiers", None, None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_create_and_list_tiers() {
    let app = setup();
    let id = create_tier(&app, "Pro").await;

    let (status, json) = call(&app, "GET", "/tiers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Pro");

    let (status, _) = call(&app, "POST", &format!("/admin/tiers/{id}/deactivate"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = call(&app, "GET", "/tiers", None, None).await;
    assert!(json.as_array().unwrap().is_empty());
    let (_, json) = call(&app, "GET", "/admin/tiers?include_inactive=true", None, None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_tier_is_bad_request() {
    let app = setup();
    let (status, json) = call(
        &app,
        "POST",
        "/admin/tiers",
        None,
        Some(json!({
            "name": "",
            "description": "Nothing",
            "price": 0,
            "duration_in_days": 30,
            "target_role": "Student"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Name is required");
}

#[tokio::test]
async fn test_missing_tier_is_not_found() {
    let app = setup();
    let uri = format!("/admin/tiers/{}", uuid::Uuid::new_v4());

    let (status, json) = call(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Subscription tier not found");

    let (status, _) = call(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = setup();
    let (status, json) = call(&app, "GET", "/admin/subscriptions/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid id: not-a-uuid");
}

#[tokio::test]
async fn test_user_routes_require_user_header() {
    let app = setup();
    let (status, json) = call(&app, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid user ID");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/transactions/me")
                .header("x-user-id", "someone")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_defaults_to_free_plan() {
    let app = setup();
    let user = UserId::new();

    let (status, json) = call(&app, "GET", "/me", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plan_name"], "Free");
    assert_eq!(json["status"], "None");
    assert!(json["id"].is_null());

    let (_, claims) = call(&app, "GET", &format!("/claims/{user}"), None, None).await;
    assert_eq!(claims["plan"], "free");
    assert_eq!(claims["expires_at"], 0);
}

#[tokio::test]
async fn test_subscribe_pay_and_claims() {
    let app = setup();
    let user = UserId::new();
    let tier_id = create_tier(&app, "Pro").await;

    let (status, json) = call(
        &app,
        "POST",
        "/subscribe",
        Some(user),
        Some(json!({ "tier_id": tier_id, "payment_provider": "vnpay" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["amount"], 199000);
    let transaction_id = json["transaction_id"].as_str().unwrap().to_string();

    let (_, me) = call(&app, "GET", "/me", Some(user), None).await;
    assert_eq!(me["plan_name"], "Free");

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/admin/transactions/{transaction_id}/status"),
        None,
        Some(json!({ "payment_status": "Paid", "provider_transaction_id": "VNP-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, me) = call(&app, "GET", "/me", Some(user), None).await;
    assert_eq!(me["plan_name"], "Pro");
    assert_eq!(me["status"], "Active");

    let (_, claims) = call(&app, "GET", &format!("/claims/{user}"), None, None).await;
    assert_eq!(claims["plan"], "pro");
    assert_eq!(claims["has_active_subscription"], true);

    let (_, transactions) = call(&app, "GET", "/transactions/me", Some(user), None).await;
    assert_eq!(transactions[0]["payment_status"], "Paid");
    assert_eq!(transactions[0]["payment_provider"], "VnPay");
}

#[tokio::test]
async fn test_unknown_payment_provider_is_bad_request() {
    let app = setup();
    let tier_id = create_tier(&app, "Pro").await;
    let (status, _) = call(
        &app,
        "POST",
        "/subscribe",
        Some(UserId::new()),
        Some(json!({ "tier_id": tier_id, "payment_provider": "paypal" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pro_subscription_and_cancel() {
    let app = setup();
    let user = UserId::new();

    let (status, json) = call(&app, "POST", "/subscribe/pro", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Pro subscription tier not found");

    create_tier(&app, "Pro").await;
    let (status, json) = call(&app, "POST", "/subscribe/pro", Some(user), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].as_str().is_some());

    let (status, json) = call(&app, "POST", "/subscribe/pro", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "User already has an active subscription");

    let (status, _) = call(&app, "POST", "/cancel", Some(user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "POST", "/cancel", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_subscription_lifecycle() {
    let app = setup();
    create_tier(&app, "Pro").await;
    let (_, json) = call(&app, "POST", "/subscribe/pro", Some(UserId::new()), None).await;
    let id = json["id"].as_str().unwrap().to_string();

    let (status, json) = call(&app, "POST", &format!("/admin/subscriptions/{id}/activate"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Subscription is already active");

    let (status, _) = call(&app, "POST", &format!("/admin/subscriptions/{id}/suspend"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, suspended) = call(&app, "GET", "/admin/subscriptions?status=Suspended", None, None).await;
    assert_eq!(suspended.as_array().unwrap().len(), 1);

    let new_end_date = chrono::Utc::now() + chrono::Duration::days(365);
    let (status, _) = call(
        &app,
        "POST",
        &format!("/admin/subscriptions/{id}/renew"),
        None,
        Some(json!({ "new_end_date": new_end_date })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, subscription) = call(&app, "GET", &format!("/admin/subscriptions/{id}"), None, None).await;
    assert_eq!(subscription["status"], "Active");

    let (status, _) = call(&app, "POST", &format!("/admin/subscriptions/{id}/expire"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = call(&app, "GET", "/admin/stats", None, None).await;
    assert_eq!(stats["total_subscriptions"], 1);
    assert_eq!(stats["expired_subscriptions"], 1);
    assert_eq!(stats["monthly_revenue"].as_array().unwrap().len(), 6);

    let (status, _) = call(&app, "DELETE", &format!("/admin/subscriptions/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", &format!("/admin/subscriptions/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscription_event_history() {
    let app = setup();
    create_tier(&app, "Pro").await;
    let (_, json) = call(&app, "POST", "/subscribe/pro", Some(UserId::new()), None).await;
    let id = json["id"].as_str().unwrap().to_string();
    call(&app, "POST", &format!("/admin/subscriptions/{id}/suspend"), None, None).await;
    call(&app, "DELETE", &format!("/admin/subscriptions/{id}"), None, None).await;

    let (status, history) = call(&app, "GET", &format!("/admin/subscriptions/{id}/events"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "SubscriptionCreated",
            "SubscriptionActivated",
            "SubscriptionSuspended",
            "SubscriptionDeleted"
        ]
    );
    assert_eq!(history[0]["aggregate_id"], id.as_str());
    assert_eq!(history[0]["aggregate_type"], "UserSubscription");

    let (status, json) = call(&app, "GET", "/admin/subscriptions/nope/events", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid id: nope");
}

#[tokio::test]
async fn test_event_log_filters() {
    let app = setup();
    create_tier(&app, "Basic").await;
    create_tier(&app, "Pro").await;

    let (status, events) = call(&app, "GET", "/admin/events?event_type=TierCreated", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 2);

    let (_, page) = call(&app, "GET", "/admin/events?aggregate_type=SubscriptionTier&limit=1&offset=1", None, None).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["aggregate_type"], "SubscriptionTier");

    let (status, json) = call(&app, "GET", "/admin/events?limit=many", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let app = setup();
    let user = UserId::new();

    let (status, json) = call(
        &app,
        "POST",
        "/subscribe",
        Some(user),
        Some(json!({ "tier_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("tier_id"));

    let (status, json) = call(&app, "POST", "/admin/tiers", None, Some(json!({ "name": "Pro" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/roles")
                .header("content-type", "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].is_string());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/roles")
                .body(Body::from("{\"name\": \"Teacher\"}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_filters() {
    let app = setup();
    let tier_id = create_tier(&app, "Pro").await;
    for provider in ["Momo", "Stripe"] {
        call(
            &app,
            "POST",
            "/subscribe",
            Some(UserId::new()),
            Some(json!({ "tier_id": tier_id, "payment_provider": provider })),
        )
        .await;
    }

    let (_, all) = call(&app, "GET", "/admin/transactions", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, momo) = call(&app, "GET", "/admin/transactions?payment_provider=momo", None, None).await;
    assert_eq!(momo.as_array().unwrap().len(), 1);

    let id = momo[0]["id"].as_str().unwrap();
    let (status, json) = call(
        &app,
        "PUT",
        &format!("/admin/transactions/{id}/status"),
        None,
        Some(json!({ "payment_status": "Settled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid payment status: Settled"));
}

#[tokio::test]
async fn test_roles_and_users() {
    let app = setup();

    let (status, json) = call(
        &app,
        "POST",
        "/roles",
        None,
        Some(json!({ "name": "Student", "description": "Learners" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let role_id = json["id"].as_str().unwrap().to_string();

    let (status, json) = call(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "email": "lan@example.com",
            "first_name": "Lan",
            "last_name": "Tran",
            "role_id": role_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = json["id"].as_str().unwrap().to_string();

    let (status, user) = call(&app, "GET", &format!("/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["full_name"], "Lan Tran");

    let (status, json) = call(&app, "DELETE", &format!("/roles/{role_id}"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cannot delete role that is assigned to users");

    let (_, roles) = call(&app, "GET", "/roles", None, None).await;
    assert_eq!(roles.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "GET", &format!("/users/{}", UserId::new()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
