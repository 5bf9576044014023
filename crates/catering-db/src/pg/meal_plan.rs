//! PostgreSQL meal plan repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::MealPlanRow;
use crate::repo::{CreateMealPlan, MealPlanRepository};

/// PostgreSQL meal plan repository
#[derive(Clone)]
pub struct PgMealPlanRepository {
    pool: PgPool,
}

impl PgMealPlanRepository {
    /// Create a new meal plan repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealPlanRepository for PgMealPlanRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<MealPlanRow>> {
        let plan = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, name, description, price, photo_url, created_at, updated_at
            FROM meal_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn find_all(&self) -> DbResult<Vec<MealPlanRow>> {
        let plans = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, name, description, price, photo_url, created_at, updated_at
            FROM meal_plans
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    async fn create(&self, plan: CreateMealPlan) -> DbResult<MealPlanRow> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (id, name, description, price, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, photo_url, created_at, updated_at
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(&plan.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }
}
