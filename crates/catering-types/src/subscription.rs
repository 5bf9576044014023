//! Subscription types and the subscription status state machine
//!
//! ```text
//! pending  --PaymentSettled-->  active
//! pending  --PaymentVoided--->  cancelled
//! active   --Paused---------->  paused
//! active   --Expired--------->  finished
//! pending | active | paused --CancelledByOwner--> cancelled
//! ```
//!
//! `cancelled` and `finished` are terminal.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{InvalidPauseWindow, InvalidTransition, MealPlan, MealPlanId, StatusParseError, UserId};

/// Length of a freshly created subscription
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Prefix of every gateway order reference
pub const ORDER_REFERENCE_PREFIX: &str = "SUBS-";

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new time-ordered subscription ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriptionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Generate a fresh gateway order reference
pub fn new_order_reference() -> String {
    format!("{ORDER_REFERENCE_PREFIX}{}", Uuid::new_v4())
}

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Created, waiting for the first payment
    Pending,
    /// Paid and delivering
    Active,
    /// Temporarily suspended by the owner
    Paused,
    /// Cancelled by the owner or by the gateway
    Cancelled,
    /// Ran past its end date
    Finished,
}

/// Something that happened to a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Gateway reported capture or settlement
    PaymentSettled,
    /// Gateway reported cancel, expire or failure
    PaymentVoided,
    /// Gateway reported the payment is still pending
    PaymentPending,
    /// Owner paused deliveries
    Paused,
    /// Owner cancelled
    CancelledByOwner,
    /// End date passed
    Expired,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PaymentSettled => "payment_settled",
            Self::PaymentVoided => "payment_voided",
            Self::PaymentPending => "payment_pending",
            Self::Paused => "paused",
            Self::CancelledByOwner => "cancelled_by_owner",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Outcome of applying a lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Status moves and must be persisted together with an audit row
    Changed {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    /// Event accepted but status stays where it is
    Unchanged(SubscriptionStatus),
}

impl Transition {
    /// Status after the transition
    pub const fn target(&self) -> SubscriptionStatus {
        match self {
            Self::Changed { to, .. } => *to,
            Self::Unchanged(status) => *status,
        }
    }
}

impl SubscriptionStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Active,
        Self::Paused,
        Self::Cancelled,
        Self::Finished,
    ];

    /// Whether no further transition is permitted
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Finished)
    }

    /// Lowercase name as stored in the database
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Finished => "finished",
        }
    }

    /// Apply an event according to the transition table
    pub fn apply(self, event: LifecycleEvent) -> Result<Transition, InvalidTransition> {
        use LifecycleEvent as E;
        use SubscriptionStatus as S;

        let to = match (self, event) {
            (S::Pending, E::PaymentSettled) => S::Active,
            (S::Pending, E::PaymentVoided) => S::Cancelled,
            (S::Pending, E::PaymentPending) => S::Pending,
            // gateway replays of an already applied notification
            (S::Active, E::PaymentSettled) => S::Active,
            (S::Cancelled, E::PaymentVoided) => S::Cancelled,
            (S::Active, E::Paused) => S::Paused,
            (S::Active, E::Expired) => S::Finished,
            (S::Pending | S::Active | S::Paused, E::CancelledByOwner) => S::Cancelled,
            (S::Cancelled, E::CancelledByOwner) => S::Cancelled,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        if to == self {
            Ok(Transition::Unchanged(self))
        } else {
            Ok(Transition::Changed { from: self, to })
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            "finished" => Ok(Self::Finished),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SubscriptionStatus {
    type Error = StatusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Requested pause, in calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl PauseWindow {
    /// Build a pause window; the end must be strictly after the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidPauseWindow> {
        if end <= start {
            return Err(InvalidPauseWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// First paused day
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Day deliveries resume
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Length of the pause
    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Push an end date back by the pause duration
    pub fn extend(&self, end_date: DateTime<Utc>) -> DateTime<Utc> {
        end_date + self.duration()
    }
}

/// Customer subscription to a meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID
    pub id: SubscriptionId,
    /// Owner
    pub user_id: UserId,
    /// Subscribed meal plan
    pub meal_plan_id: MealPlanId,
    /// Recipient name
    pub name: String,
    /// Recipient phone number
    pub phone_number: String,
    /// Selected meal types, in the order the customer chose them
    pub meal_types: Vec<String>,
    /// Selected delivery days, in the order the customer chose them
    pub delivery_days: Vec<String>,
    /// Allergy notes
    pub allergies: Option<String>,
    /// Price fixed at creation
    pub total_price: f64,
    /// Gateway order reference
    pub order_id: String,
    /// Current status
    pub status: SubscriptionStatus,
    /// First paused day (only while paused)
    pub pause_start_date: Option<NaiveDate>,
    /// Day deliveries resume (only while paused)
    pub pause_end_date: Option<NaiveDate>,
    /// Start of the subscription
    pub start_date: DateTime<Utc>,
    /// End of the subscription
    pub end_date: Option<DateTime<Utc>>,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
    /// When the subscription was last updated
    pub updated_at: DateTime<Utc>,
}

/// Subscription enriched with its meal plan for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub meal_plan: MealPlan,
}
