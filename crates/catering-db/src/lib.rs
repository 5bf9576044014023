//! Catering DB - Database abstractions
//!
//! SQLx-based persistence for subscriptions, their status audit log and the
//! meal plan catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use catering_db::{create_pool, run_migrations, Repositories, SubscriptionRepository};
//!
//! let pool = create_pool("postgres://localhost/catering").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let sub = repos.subscriptions.find_by_order_id("SUBS-...").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
