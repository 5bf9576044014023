//! Meal plan catalog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique meal plan identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealPlanId(pub Uuid);

impl MealPlanId {
    /// Create a new time-ordered meal plan ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MealPlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MealPlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MealPlanId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Meal plan offered in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Meal plan ID
    pub id: MealPlanId,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: String,
    /// Price of a single meal, in whole currency units
    pub price: f64,
    /// Photo URL
    pub photo_url: String,
    /// When the plan was added to the catalog
    pub created_at: DateTime<Utc>,
}
