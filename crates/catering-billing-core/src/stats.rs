//! Statistics aggregator
//!
//! Admin reporting over the subscription store. Ranges are whole days: the
//! start date from midnight, the end date through 23:59:59 UTC.

use catering_db::{MealPlanRepository, SubscriptionRepository};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::instrument;

use crate::service::SubscriptionService;
use crate::BillingError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive reporting range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Parse a `YYYY-MM-DD` pair
    pub fn parse(start: &str, end: &str) -> Result<Self, BillingError> {
        Self::from_dates(parse_date(start, "start_date")?, parse_date(end, "end_date")?)
    }

    /// Build a range covering `start` through the end of `end`
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, BillingError> {
        if end < start {
            return Err(BillingError::InvalidDateRange(format!(
                "end_date {end} is before start_date {start}"
            )));
        }

        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Ok(Self {
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end: end.and_time(end_of_day).and_utc(),
        })
    }

    /// First instant in range
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant in range
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, BillingError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        BillingError::InvalidDateRange(format!("{field} must be formatted as YYYY-MM-DD"))
    })
}

impl<S: SubscriptionRepository, M: MealPlanRepository> SubscriptionService<S, M> {
    /// Subscriptions created within the range
    #[instrument(skip(self))]
    pub async fn new_subscriptions_count(&self, range: DateRange) -> Result<i64, BillingError> {
        Ok(self
            .subscriptions
            .count_created_in_range(range.start, range.end)
            .await?)
    }

    /// Monthly recurring revenue, approximated as the total price of currently
    /// active subscriptions created within the range
    #[instrument(skip(self))]
    pub async fn monthly_recurring_revenue(&self, range: DateRange) -> Result<f64, BillingError> {
        Ok(self
            .subscriptions
            .sum_active_revenue_in_range(range.start, range.end)
            .await?)
    }

    /// Subscriptions currently active
    #[instrument(skip(self))]
    pub async fn total_active_subscriptions(&self) -> Result<i64, BillingError> {
        Ok(self.subscriptions.count_active().await?)
    }

    /// Moves from cancelled or finished back to active within the range
    #[instrument(skip(self))]
    pub async fn reactivation_count(&self, range: DateRange) -> Result<i64, BillingError> {
        Ok(self
            .subscriptions
            .count_reactivations_in_range(range.start, range.end)
            .await?)
    }
}
