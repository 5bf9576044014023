//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use catering_types::SubscriptionStatus;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, PauseChange, StatusChange, SubscriptionRepository};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, meal_plan_id, name, phone_number, meal_types, \
     delivery_days, allergies, total_price, order_id, status, pause_start_date, pause_end_date, \
     start_date, end_date, created_at, updated_at";

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_status_log(
        tx: &mut Transaction<'_, Postgres>,
        subscription_id: Uuid,
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subscription_status_logs (id, subscription_id, old_status, new_status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(subscription_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (id, user_id, meal_plan_id, name, phone_number, meal_types,
                                       delivery_days, allergies, total_price, order_id, status,
                                       start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(sub.id)
        .bind(sub.user_id)
        .bind(sub.meal_plan_id)
        .bind(&sub.name)
        .bind(&sub.phone_number)
        .bind(&sub.meal_types)
        .bind(&sub.delivery_days)
        .bind(&sub.allergies)
        .bind(sub.total_price)
        .bind(&sub.order_id)
        .bind(sub.status.as_str())
        .bind(sub.start_date)
        .bind(sub.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }

    async fn update_status(&self, change: StatusChange) -> DbResult<SubscriptionRow> {
        let mut tx = self.pool.begin().await?;

        Self::insert_status_log(&mut tx, change.subscription_id, change.from, change.to).await?;

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET status = $1, pause_start_date = NULL, pause_end_date = NULL,
                updated_at = NOW()
            WHERE id = $2
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(change.to.as_str())
        .bind(change.subscription_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        tx.commit().await?;

        Ok(row)
    }

    async fn update_pause(&self, change: PauseChange) -> DbResult<SubscriptionRow> {
        let mut tx = self.pool.begin().await?;

        Self::insert_status_log(
            &mut tx,
            change.subscription_id,
            change.from,
            SubscriptionStatus::Paused,
        )
        .await?;

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET status = $1, pause_start_date = $2, pause_end_date = $3, end_date = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(SubscriptionStatus::Paused.as_str())
        .bind(change.pause_start_date)
        .bind(change.pause_end_date)
        .bind(change.end_date)
        .bind(change.subscription_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        tx.commit().await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_id_and_user_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn find_expired_active(&self, as_of: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE status = $1 AND end_date < $2
            ORDER BY end_date
            "#
        ))
        .bind(SubscriptionStatus::Active.as_str())
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn count_created_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions WHERE created_at BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn sum_active_revenue_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_price), 0)::DOUBLE PRECISION
            FROM subscriptions
            WHERE status = $1 AND created_at BETWEEN $2 AND $3
            "#,
        )
        .bind(SubscriptionStatus::Active.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE status = $1")
            .bind(SubscriptionStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_reactivations_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM subscription_status_logs
            WHERE new_status = $1
              AND old_status IN ($2, $3)
              AND changed_at BETWEEN $4 AND $5
            "#,
        )
        .bind(SubscriptionStatus::Active.as_str())
        .bind(SubscriptionStatus::Cancelled.as_str())
        .bind(SubscriptionStatus::Finished.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
