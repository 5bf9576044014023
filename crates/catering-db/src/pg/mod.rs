//! PostgreSQL repository implementations

mod meal_plan;
mod subscription;

pub use meal_plan::PgMealPlanRepository;
pub use subscription::PgSubscriptionRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub meal_plans: PgMealPlanRepository,
    pub subscriptions: PgSubscriptionRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            meal_plans: PgMealPlanRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool),
        }
    }
}
