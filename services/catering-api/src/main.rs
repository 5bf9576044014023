//! Catering API
//!
//! Meal subscription service: subscription lifecycle, Midtrans payments, the
//! meal plan catalog and admin statistics.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/subscriptions` - Subscribe to a meal plan, returns the payment page
//! - `GET /api/v1/subscriptions` - List the caller's subscriptions
//! - `PUT /api/v1/subscriptions/{id}/pause` - Pause an active subscription
//! - `DELETE /api/v1/subscriptions/{id}` - Cancel a subscription
//! - `GET /api/v1/subscriptions/admin/stats/{new,mrr,reactivations,active-total}` - Admin statistics
//! - `POST /api/v1/subscriptions/webhook/midtrans` - Midtrans payment notifications
//! - `GET /api/v1/meal-plans`, `GET /api/v1/meal-plans/{id}` - Catalog
//! - `POST /api/v1/meal-plans` - Add a meal plan (admin)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod auth;
mod config;
mod error;
mod handlers;
mod scheduler;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use catering_billing_core::{MealPlanCatalog, MidtransProvider, SubscriptionService};
use catering_db::{PoolOptions, Repositories};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("catering_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Catering API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        midtrans_production = config.billing.production,
        sweep_enabled = config.sweep_enabled,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Database
    let pool = catering_db::create_pool_with_options(
        &config.database_url,
        PoolOptions {
            max_connections: config.database_max_connections,
            ..PoolOptions::default()
        },
    )
    .await?;
    catering_db::run_migrations(&pool).await?;
    tracing::info!("Database pool created");

    let repos = Repositories::new(pool.clone());

    // Services
    let gateway = Arc::new(MidtransProvider::new(config.billing.clone()));
    let subscriptions = SubscriptionService::new(
        Arc::new(repos.subscriptions.clone()),
        Arc::new(repos.meal_plans.clone()),
        gateway,
    );
    let catalog = MealPlanCatalog::new(
        Arc::new(repos.meal_plans),
        config.billing.catalog_cache_ttl,
    );

    let state = AppState::new(subscriptions, catalog, pool, config.clone());

    if config.sweep_enabled {
        scheduler::spawn_expiry_sweep(Arc::clone(&state.subscriptions));
        tracing::info!("Daily expiry sweep scheduled");
    }

    let app = build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let api_v1 = Router::new()
        // Subscription routes
        .route(
            "/subscriptions",
            post(handlers::create_subscription).get(handlers::list_subscriptions),
        )
        .route("/subscriptions/{id}", delete(handlers::cancel_subscription))
        .route("/subscriptions/{id}/pause", put(handlers::pause_subscription))
        // Admin statistics
        .route(
            "/subscriptions/admin/stats/new",
            get(handlers::new_subscriptions_stats),
        )
        .route("/subscriptions/admin/stats/mrr", get(handlers::mrr_stats))
        .route(
            "/subscriptions/admin/stats/reactivations",
            get(handlers::reactivation_stats),
        )
        .route(
            "/subscriptions/admin/stats/active-total",
            get(handlers::active_total_stats),
        )
        // Gateway notifications (no bearer token, raw body)
        .route(
            "/subscriptions/webhook/midtrans",
            post(handlers::midtrans_webhook),
        )
        // Meal plan catalog
        .route(
            "/meal-plans",
            get(handlers::list_meal_plans).post(handlers::create_meal_plan),
        )
        .route("/meal-plans/{id}", get(handlers::get_meal_plan));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Gateway round-trips dominate; local operations finish in milliseconds
    let latency_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("catering_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "catering_subscriptions_created_total",
        "Subscriptions created with a payment page"
    );
    metrics::describe_counter!(
        "catering_subscriptions_paused_total",
        "Subscriptions paused by their owners"
    );
    metrics::describe_counter!(
        "catering_subscriptions_cancelled_total",
        "Cancel requests completed by owners"
    );
    metrics::describe_counter!(
        "catering_webhooks_processed_total",
        "Payment notifications by outcome"
    );
    metrics::describe_counter!(
        "catering_sweep_finished_total",
        "Subscriptions finished by the expiry sweep"
    );
    metrics::describe_counter!(
        "catering_sweep_failures_total",
        "Subscriptions the expiry sweep failed to finish"
    );
    metrics::describe_histogram!(
        "catering_operation_duration_seconds",
        "Handler latency in seconds by operation and result"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
