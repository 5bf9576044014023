//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use catering_types::SubscriptionStatus;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Meal plan repository trait
#[async_trait]
pub trait MealPlanRepository: Send + Sync {
    /// Find a meal plan by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<MealPlanRow>>;

    /// All meal plans, newest first
    async fn find_all(&self) -> DbResult<Vec<MealPlanRow>>;

    /// Create a new meal plan
    async fn create(&self, plan: CreateMealPlan) -> DbResult<MealPlanRow>;
}

/// Create meal plan input
#[derive(Debug, Clone)]
pub struct CreateMealPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
}

/// Subscription repository trait
///
/// Every status change goes through [`update_status`](Self::update_status) or
/// [`update_pause`](Self::update_pause); both write the status and its audit
/// row in a single transaction.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription. Fails with `UniqueViolation` when the order
    /// reference is already taken.
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Persist a status change and its audit row atomically.
    ///
    /// The pause window is cleared: it only exists while paused, and pausing
    /// goes through [`update_pause`](Self::update_pause).
    async fn update_status(&self, change: StatusChange) -> DbResult<SubscriptionRow>;

    /// Persist a pause (window, extended end date, paused status) and its
    /// audit row atomically
    async fn update_pause(&self, change: PauseChange) -> DbResult<SubscriptionRow>;

    /// Find a subscription by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>>;

    /// Find a subscription by ID, only if owned by the given user
    async fn find_by_id_and_user_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>>;

    /// Find a subscription by gateway order reference
    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<SubscriptionRow>>;

    /// All subscriptions for a user, newest first
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<SubscriptionRow>>;

    /// Active subscriptions whose end date is before `as_of`
    async fn find_expired_active(&self, as_of: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>>;

    /// Subscriptions created within `[start, end]`
    async fn count_created_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> DbResult<i64>;

    /// Sum of total price over active subscriptions created within `[start, end]`
    async fn sum_active_revenue_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<f64>;

    /// Number of active subscriptions
    async fn count_active(&self) -> DbResult<i64>;

    /// Audit rows moving from cancelled or finished to active within `[start, end]`
    async fn count_reactivations_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_plan_id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub meal_types: Vec<String>,
    pub delivery_days: Vec<String>,
    pub allergies: Option<String>,
    pub total_price: f64,
    pub order_id: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Status change to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub subscription_id: Uuid,
    pub from: SubscriptionStatus,
    pub to: SubscriptionStatus,
}

/// Pause to persist; the status becomes `paused`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseChange {
    pub subscription_id: Uuid,
    pub from: SubscriptionStatus,
    pub pause_start_date: NaiveDate,
    pub pause_end_date: NaiveDate,
    pub end_date: Option<DateTime<Utc>>,
}
