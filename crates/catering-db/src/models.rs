//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use catering_types::{MealPlan, Subscription, SubscriptionStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Meal plan row from the database
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
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
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub pause_start_date: Option<NaiveDate>,
    pub pause_end_date: Option<NaiveDate>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status audit row from the database
#[derive(Debug, Clone, FromRow)]
pub struct StatusLogRow {
    pub id: Uuid,
    pub subscription_id: Uuid,
    #[sqlx(try_from = "String")]
    pub old_status: SubscriptionStatus,
    #[sqlx(try_from = "String")]
    pub new_status: SubscriptionStatus,
    pub changed_at: DateTime<Utc>,
}

impl From<MealPlanRow> for MealPlan {
    fn from(row: MealPlanRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            price: row.price,
            photo_url: row.photo_url,
            created_at: row.created_at,
        }
    }
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            meal_plan_id: row.meal_plan_id.into(),
            name: row.name,
            phone_number: row.phone_number,
            meal_types: row.meal_types,
            delivery_days: row.delivery_days,
            allergies: row.allergies,
            total_price: row.total_price,
            order_id: row.order_id,
            status: row.status,
            pause_start_date: row.pause_start_date,
            pause_end_date: row.pause_end_date,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
