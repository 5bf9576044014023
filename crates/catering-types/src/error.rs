//! Common error types

use thiserror::Error;

use crate::{LifecycleEvent, SubscriptionStatus};

/// Error parsing a subscription status string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid subscription status: {0}")]
pub struct StatusParseError(pub String);

/// A lifecycle event that the current status does not accept
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot apply {event} to a {from} subscription")]
pub struct InvalidTransition {
    /// Status the subscription was in
    pub from: SubscriptionStatus,
    /// Event that was rejected
    pub event: LifecycleEvent,
}

/// Pause window whose end precedes (or equals) its start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pause end date {end} must be after start date {start}")]
pub struct InvalidPauseWindow {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}
