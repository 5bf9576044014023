//! Meal plan catalog with a TTL cache
//!
//! Only catalog reads go through the cache; the lifecycle manager reads the
//! repository directly.

use std::sync::Arc;
use std::time::Duration;

use catering_db::{CreateMealPlan, MealPlanRepository};
use catering_types::{MealPlan, MealPlanId};
use moka::future::Cache;
use tracing::{debug, info, instrument};

use crate::BillingError;

/// Validated meal plan to add to the catalog
#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
}

/// Cached meal plan catalog
#[derive(Clone)]
pub struct MealPlanCatalog<R: MealPlanRepository> {
    repo: Arc<R>,
    /// Whole catalog, newest first
    all: Cache<(), Arc<Vec<MealPlan>>>,
    by_id: Cache<MealPlanId, MealPlan>,
}

impl<R: MealPlanRepository> MealPlanCatalog<R> {
    /// Create a catalog whose entries live for `ttl`
    pub fn new(repo: Arc<R>, ttl: Duration) -> Self {
        Self {
            repo,
            all: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
            by_id: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(1_000)
                .build(),
        }
    }

    /// All meal plans, newest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Arc<Vec<MealPlan>>, BillingError> {
        if let Some(plans) = self.all.get(&()).await {
            return Ok(plans);
        }

        let plans: Arc<Vec<MealPlan>> = Arc::new(
            self.repo
                .find_all()
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        );
        debug!(count = plans.len(), "Caching meal plan catalog");
        self.all.insert((), Arc::clone(&plans)).await;

        Ok(plans)
    }

    /// One meal plan
    #[instrument(skip(self))]
    pub async fn get(&self, id: MealPlanId) -> Result<MealPlan, BillingError> {
        if let Some(plan) = self.by_id.get(&id).await {
            return Ok(plan);
        }

        let plan: MealPlan = self
            .repo
            .find_by_id(id.0)
            .await?
            .ok_or(BillingError::MealPlanNotFound)?
            .into();
        self.by_id.insert(id, plan.clone()).await;

        Ok(plan)
    }

    /// Add a meal plan and invalidate the cached catalog listing
    #[instrument(skip(self, plan), fields(name = %plan.name))]
    pub async fn create(&self, plan: NewMealPlan) -> Result<MealPlan, BillingError> {
        let row = self
            .repo
            .create(CreateMealPlan {
                id: MealPlanId::new().0,
                name: plan.name,
                description: plan.description,
                price: plan.price,
                photo_url: plan.photo_url,
            })
            .await?;

        self.all.invalidate(&()).await;

        let plan: MealPlan = row.into();
        info!(meal_plan_id = %plan.id, "Meal plan created");
        Ok(plan)
    }
}
