//! Catering Billing Core - Subscription lifecycle and billing logic
//!
//! Core functionality for meal subscriptions: price calculation, the
//! Midtrans Snap integration, payment notification reconciliation, the
//! expiry sweep and admin statistics.
//!
//! # Example
//!
//! ```rust,ignore
//! use catering_billing_core::{BillingConfig, MidtransProvider, NewSubscription, SubscriptionService};
//! use catering_db::Repositories;
//!
//! let config = BillingConfig::new("SB-Mid-server-...").with_payment_duration_minutes(60);
//! let gateway = Arc::new(MidtransProvider::new(config)?);
//! let service = SubscriptionService::new(
//!     Arc::new(repos.subscriptions),
//!     Arc::new(repos.meal_plans),
//!     gateway,
//! );
//!
//! let checkout = service.create_subscription(user_id, "alice@example.com", request).await?;
//! println!("pay at {}", checkout.payment.redirect_url);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod midtrans;
pub mod pricing;
pub mod provider;
pub mod service;
pub mod stats;
pub mod webhook;

pub use catalog::{MealPlanCatalog, NewMealPlan};
pub use config::BillingConfig;
pub use error::BillingError;
pub use midtrans::MidtransProvider;
pub use pricing::{calculate_total_price, gross_amount, WEEKS_PER_MONTH};
pub use provider::{CustomerDetails, LineItem, PaymentProvider, PaymentRequest};
pub use service::{
    Checkout, NewSubscription, NotificationOutcome, SubscriptionService, SweepFailure, SweepReport,
};
pub use stats::DateRange;
pub use webhook::{constant_time_eq, NotificationVerifier, PaymentNotification, TransactionStatus};

// Re-export the gateway handle for convenience
pub use catering_types::PaymentSession;

/// Result alias for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
