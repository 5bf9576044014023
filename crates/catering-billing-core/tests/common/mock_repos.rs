//! Mock repositories for testing
//!
//! `MockSubscriptionRepository` keeps the status + audit log write atomic and
//! lets tests inject storage failures.

use async_trait::async_trait;
use catering_db::{
    CreateMealPlan, CreateSubscription, DbError, DbResult, MealPlanRepository, MealPlanRow,
    PauseChange, StatusChange, StatusLogRow, SubscriptionRepository, SubscriptionRow,
};
use catering_types::SubscriptionStatus;
use chrono::{DateTime, Duration, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn simulated_failure() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subscriptions: Arc<DashMap<Uuid, SubscriptionRow>>,
    logs: Arc<Mutex<Vec<StatusLogRow>>>,
    fail_log_writes: Arc<AtomicBool>,
    failing_rows: Arc<DashSet<Uuid>>,
    status_write_attempts: Arc<AtomicUsize>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a subscription row with sensible defaults
    pub fn test_row(user_id: Uuid, meal_plan_id: Uuid, status: SubscriptionStatus) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: Uuid::now_v7(),
            user_id,
            meal_plan_id,
            name: "Budi Santoso".to_string(),
            phone_number: "081234567890".to_string(),
            meal_types: vec!["lunch".to_string()],
            delivery_days: vec!["monday".to_string()],
            allergies: None,
            total_price: 129_000.0,
            order_id: format!("SUBS-{}", Uuid::new_v4()),
            status,
            pause_start_date: None,
            pause_end_date: None,
            start_date: now,
            end_date: Some(now + Duration::days(30)),
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert a row directly
    pub fn insert_subscription(&self, row: SubscriptionRow) {
        self.subscriptions.insert(row.id, row);
    }

    /// Append an audit row directly
    #[allow(dead_code)]
    pub fn insert_log(
        &self,
        subscription_id: Uuid,
        old_status: SubscriptionStatus,
        new_status: SubscriptionStatus,
        changed_at: DateTime<Utc>,
    ) {
        self.logs.lock().unwrap().push(StatusLogRow {
            id: Uuid::now_v7(),
            subscription_id,
            old_status,
            new_status,
            changed_at,
        });
    }

    /// Current state of a row
    pub fn get(&self, id: Uuid) -> Option<SubscriptionRow> {
        self.subscriptions.get(&id).map(|r| r.value().clone())
    }

    /// All audit rows for a subscription, in write order
    pub fn logs_for(&self, id: Uuid) -> Vec<StatusLogRow> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.subscription_id == id)
            .cloned()
            .collect()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Make every audit log write fail
    #[allow(dead_code)]
    pub fn fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::SeqCst);
    }

    /// Make status writes for one row fail
    #[allow(dead_code)]
    pub fn fail_writes_for(&self, id: Uuid) {
        self.failing_rows.insert(id);
    }

    /// Number of status or pause writes attempted
    #[allow(dead_code)]
    pub fn status_write_attempts(&self) -> usize {
        self.status_write_attempts.load(Ordering::SeqCst)
    }

    /// Log first, then the row; either failing leaves both untouched
    fn write_with_log(
        &self,
        id: Uuid,
        from: SubscriptionStatus,
        to: SubscriptionStatus,
        mutate: impl FnOnce(&mut SubscriptionRow),
    ) -> DbResult<SubscriptionRow> {
        self.status_write_attempts.fetch_add(1, Ordering::SeqCst);

        let mut row = self.subscriptions.get_mut(&id).ok_or(DbError::NotFound)?;
        if self.failing_rows.contains(&id) || self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(simulated_failure());
        }

        let now = Utc::now();
        self.logs.lock().unwrap().push(StatusLogRow {
            id: Uuid::now_v7(),
            subscription_id: id,
            old_status: from,
            new_status: to,
            changed_at: now,
        });

        mutate(row.value_mut());
        row.status = to;
        row.updated_at = now;
        Ok(row.clone())
    }
}

fn in_range(at: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    at >= start && at <= end
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        if self
            .subscriptions
            .iter()
            .any(|r| r.value().order_id == sub.order_id)
        {
            return Err(DbError::UniqueViolation(
                "subscriptions_order_id_key".to_string(),
            ));
        }

        let now = Utc::now();
        let row = SubscriptionRow {
            id: sub.id,
            user_id: sub.user_id,
            meal_plan_id: sub.meal_plan_id,
            name: sub.name,
            phone_number: sub.phone_number,
            meal_types: sub.meal_types,
            delivery_days: sub.delivery_days,
            allergies: sub.allergies,
            total_price: sub.total_price,
            order_id: sub.order_id,
            status: sub.status,
            pause_start_date: None,
            pause_end_date: None,
            start_date: sub.start_date,
            end_date: sub.end_date,
            created_at: now,
            updated_at: now,
        };
        self.insert_subscription(row.clone());
        Ok(row)
    }

    async fn update_status(&self, change: StatusChange) -> DbResult<SubscriptionRow> {
        self.write_with_log(change.subscription_id, change.from, change.to, |row| {
            row.pause_start_date = None;
            row.pause_end_date = None;
        })
    }

    async fn update_pause(&self, change: PauseChange) -> DbResult<SubscriptionRow> {
        self.write_with_log(
            change.subscription_id,
            change.from,
            SubscriptionStatus::Paused,
            |row| {
                row.pause_start_date = Some(change.pause_start_date);
                row.pause_end_date = Some(change.pause_end_date);
                row.end_date = change.end_date;
            },
        )
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.get(id))
    }

    async fn find_by_id_and_user_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.get(id).filter(|row| row.user_id == user_id))
    }

    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subscriptions
            .iter()
            .find(|r| r.value().order_id == order_id)
            .map(|r| r.value().clone()))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        let mut rows: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn find_expired_active(&self, as_of: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| {
                let row = r.value();
                row.status == SubscriptionStatus::Active && row.end_date.is_some_and(|end| end < as_of)
            })
            .map(|r| r.value().clone())
            .collect())
    }

    async fn count_created_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| in_range(r.value().created_at, start, end))
            .count() as i64)
    }

    async fn sum_active_revenue_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<f64> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| {
                let row = r.value();
                row.status == SubscriptionStatus::Active && in_range(row.created_at, start, end)
            })
            .map(|r| r.value().total_price)
            .sum())
    }

    async fn count_active(&self) -> DbResult<i64> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| r.value().status == SubscriptionStatus::Active)
            .count() as i64)
    }

    async fn count_reactivations_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                log.new_status == SubscriptionStatus::Active
                    && matches!(
                        log.old_status,
                        SubscriptionStatus::Cancelled | SubscriptionStatus::Finished
                    )
                    && in_range(log.changed_at, start, end)
            })
            .count() as i64)
    }
}

/// In-memory meal plan repository for testing
#[derive(Default, Clone)]
pub struct MockMealPlanRepository {
    plans: Arc<DashMap<Uuid, MealPlanRow>>,
    reads: Arc<AtomicUsize>,
}

impl MockMealPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a test meal plan with the given unit price
    pub fn test_plan(name: &str, price: f64) -> MealPlanRow {
        MealPlanRow {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: format!("{name} meals delivered fresh"),
            price,
            photo_url: format!("https://cdn.example.com/{}.jpg", name.to_lowercase()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Insert a plan directly
    pub fn insert_plan(&self, plan: MealPlanRow) {
        self.plans.insert(plan.id, plan);
    }

    /// Delete a plan behind the service's back
    #[allow(dead_code)]
    pub fn remove_plan(&self, id: Uuid) {
        self.plans.remove(&id);
    }

    /// Number of repository reads served
    #[allow(dead_code)]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MealPlanRepository for MockMealPlanRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<MealPlanRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.plans.get(&id).map(|r| r.value().clone()))
    }

    async fn find_all(&self) -> DbResult<Vec<MealPlanRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut plans: Vec<_> = self.plans.iter().map(|r| r.value().clone()).collect();
        plans.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(plans)
    }

    async fn create(&self, plan: CreateMealPlan) -> DbResult<MealPlanRow> {
        let row = MealPlanRow {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            photo_url: plan.photo_url,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.insert_plan(row.clone());
        Ok(row)
    }
}
