//! Catering Types - Shared domain types
//!
//! This crate contains domain types used across the catering services:
//! - User identity and roles
//! - Meal plan catalog entries
//! - Subscriptions and the subscription status state machine
//! - Payment session handles returned by the gateway

pub mod error;
pub mod meal_plan;
pub mod payment;
pub mod subscription;
pub mod user;

pub use error::*;
pub use meal_plan::*;
pub use payment::*;
pub use subscription::*;
pub use user::*;
