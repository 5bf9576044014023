//! Application state for the Catering API service.

use std::sync::Arc;

use axum::extract::FromRef;
use catering_billing_core::{MealPlanCatalog, NotificationVerifier, SubscriptionService};
use catering_db::pg::{PgMealPlanRepository, PgSubscriptionRepository};
use catering_db::DbPool;

use crate::auth::TokenVerifier;
use crate::config::Config;

/// Lifecycle manager backed by PostgreSQL
pub type Subscriptions = SubscriptionService<PgSubscriptionRepository, PgMealPlanRepository>;

/// Meal plan catalog backed by PostgreSQL
pub type Catalog = MealPlanCatalog<PgMealPlanRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Subscription lifecycle (create, pause, cancel, notifications, stats)
    pub subscriptions: Arc<Subscriptions>,
    /// Cached meal plan catalog
    pub catalog: Arc<Catalog>,
    /// Access token verification
    pub tokens: Arc<TokenVerifier>,
    /// Notification signature verification, when enabled
    pub notifications: Option<NotificationVerifier>,
    /// Database pool (readiness probe)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(subscriptions: Subscriptions, catalog: Catalog, pool: DbPool, config: Config) -> Self {
        let notifications = config
            .billing
            .verify_signature
            .then(|| NotificationVerifier::new(config.billing.server_key.clone()));

        Self {
            subscriptions: Arc::new(subscriptions),
            catalog: Arc::new(catalog),
            tokens: Arc::new(TokenVerifier::new(config.access_secret.as_bytes())),
            notifications,
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("http_port", &self.config.http_port)
            .field("verify_signature", &self.notifications.is_some())
            .finish_non_exhaustive()
    }
}
