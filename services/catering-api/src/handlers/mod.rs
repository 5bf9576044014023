//! REST API handlers

pub mod health;
pub mod meal_plan;
pub mod shared;
pub mod stats;
pub mod subscription;
pub mod webhook;

pub use health::*;
pub use meal_plan::*;
pub use stats::*;
pub use subscription::*;
pub use webhook::*;
