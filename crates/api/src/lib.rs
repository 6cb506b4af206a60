//! HTTP API server with observability for the subscription service.
//!
//! Every route turns its input into a command or query and sends it through
//! the [`Mediator`]. Requests are logged with `tracing` and counted in
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use application::{AppError, Mediator, Repositories, build_mediator};
use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub mediator: Mediator,
}

impl AppState {
    /// Registers every handler against the given repositories.
    pub fn new(repos: Repositories) -> Result<Self, AppError> {
        Ok(Self {
            mediator: build_mediator(repos)?,
        })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/health/database", get(routes::health::database))
        .merge(user_routes())
        .merge(admin_routes())
        .merge(identity_routes())
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router<AppState> {
    use routes::{subscriptions, tiers, transactions};

    Router::new()
        .route("/tiers", get(tiers::list_active))
        .route("/me", get(subscriptions::current))
        .route("/transactions/me", get(transactions::mine))
        .route("/claims/{user_id}", get(subscriptions::claims))
        .route("/subscribe", post(subscriptions::subscribe))
        .route("/subscribe/pro", post(subscriptions::subscribe_pro))
        .route("/cancel", post(subscriptions::cancel))
}

fn admin_routes() -> Router<AppState> {
    use routes::{events, subscriptions, tiers, transactions};

    Router::new()
        .route("/admin/tiers", get(tiers::list).post(tiers::create))
        .route(
            "/admin/tiers/{id}",
            get(tiers::get).put(tiers::update).delete(tiers::delete),
        )
        .route("/admin/tiers/{id}/activate", post(tiers::activate))
        .route("/admin/tiers/{id}/deactivate", post(tiers::deactivate))
        .route("/admin/subscriptions", get(subscriptions::list))
        .route(
            "/admin/subscriptions/{id}",
            get(subscriptions::get).delete(subscriptions::delete),
        )
        .route(
            "/admin/subscriptions/{id}/activate",
            post(subscriptions::activate),
        )
        .route(
            "/admin/subscriptions/{id}/suspend",
            post(subscriptions::suspend),
        )
        .route("/admin/subscriptions/{id}/renew", post(subscriptions::renew))
        .route(
            "/admin/subscriptions/{id}/expire",
            post(subscriptions::expire),
        )
        .route(
            "/admin/subscriptions/{id}/events",
            get(events::subscription_history),
        )
        .route("/admin/events", get(events::list))
        .route("/admin/stats", get(subscriptions::stats))
        .route("/admin/transactions", get(transactions::list))
        .route("/admin/transactions/{id}", get(transactions::get))
        .route(
            "/admin/transactions/{id}/status",
            put(transactions::update_status),
        )
}

fn identity_routes() -> Router<AppState> {
    use routes::users;

    Router::new()
        .route("/roles", get(users::list_roles).post(users::create_role))
        .route(
            "/roles/{id}",
            get(users::get_role).delete(users::delete_role),
        )
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/role", put(users::change_role))
}
