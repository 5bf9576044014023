//! Billing errors

use catering_types::{InvalidPauseWindow, InvalidTransition};
use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Meal plan not found
    #[error("meal plan not found")]
    MealPlanNotFound,

    /// Subscription not found, or not owned by the caller
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// Malformed payment notification
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Notification signature did not match
    #[error("invalid notification signature")]
    InvalidSignature,

    /// Malformed statistics date range
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// Pause window ends before it starts
    #[error(transparent)]
    InvalidPauseWindow(#[from] InvalidPauseWindow),

    /// Status does not accept the requested lifecycle event
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Payment provider error
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] catering_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MealPlanNotFound | Self::SubscriptionNotFound)
    }

    /// Check if this error was caused by bad caller input
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidPayload(_)
                | Self::InvalidSignature
                | Self::InvalidDateRange(_)
                | Self::InvalidPauseWindow(_)
        )
    }

    /// Check if this is a provider error
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::ProviderError(_))
    }
}
