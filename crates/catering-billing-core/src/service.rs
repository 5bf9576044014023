//! Subscription lifecycle manager
//!
//! Orchestrates creation, pause, cancellation, payment notification
//! reconciliation and the expiry sweep. Every status change is decided by
//! [`SubscriptionStatus::apply`] and persisted through the repository's
//! atomic status + audit log write.

use std::sync::Arc;

use catering_db::{
    CreateSubscription, MealPlanRepository, PauseChange, StatusChange, SubscriptionRepository,
    SubscriptionRow,
};
use catering_types::{
    new_order_reference, LifecycleEvent, MealPlan, MealPlanId, PauseWindow, PaymentSession,
    Subscription, SubscriptionDetails, SubscriptionId, SubscriptionStatus, Transition, UserId,
    SUBSCRIPTION_PERIOD_DAYS,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::pricing::{calculate_total_price, gross_amount};
use crate::provider::{CustomerDetails, LineItem, PaymentProvider, PaymentRequest};
use crate::webhook::PaymentNotification;
use crate::BillingError;

/// Validated subscription request
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub meal_plan_id: MealPlanId,
    pub name: String,
    pub phone_number: String,
    pub meal_types: Vec<String>,
    pub delivery_days: Vec<String>,
    pub allergies: Option<String>,
}

/// A pending subscription and the payment page that will activate it
#[derive(Debug, Clone)]
pub struct Checkout {
    pub subscription: Subscription,
    pub payment: PaymentSession,
}

/// What a payment notification did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Status changed and was logged
    Applied {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    /// Status already matched (gateway replay or `pending`)
    Unchanged(SubscriptionStatus),
    /// Transaction status we do not act on
    Ignored,
    /// Current status does not accept the event; nothing written
    Rejected(SubscriptionStatus),
}

impl NotificationOutcome {
    /// Short label for metrics and logs
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::Unchanged(_) => "unchanged",
            Self::Ignored => "ignored",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Result of an expiry sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Cut-off the sweep ran against
    pub as_of: DateTime<Utc>,
    /// Expired active subscriptions found
    pub examined: usize,
    /// Subscriptions moved to finished
    pub finished: usize,
    /// Per-row failures; the sweep kept going past each of them
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Whether every expired subscription was finished
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One subscription the sweep could not finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub subscription_id: SubscriptionId,
    pub error: String,
}

/// Subscription lifecycle service
pub struct SubscriptionService<S: SubscriptionRepository, M: MealPlanRepository> {
    pub(crate) subscriptions: Arc<S>,
    meal_plans: Arc<M>,
    gateway: Arc<dyn PaymentProvider>,
}

impl<S: SubscriptionRepository, M: MealPlanRepository> SubscriptionService<S, M> {
    /// Create a new subscription service
    pub fn new(subscriptions: Arc<S>, meal_plans: Arc<M>, gateway: Arc<dyn PaymentProvider>) -> Self {
        Self {
            subscriptions,
            meal_plans,
            gateway,
        }
    }

    // =========================================================================
    // Owner operations
    // =========================================================================

    /// Create a pending subscription and open a gateway transaction for it.
    ///
    /// The row is committed before the gateway call. If the gateway fails the
    /// subscription stays `pending` and the error is returned.
    #[instrument(skip(self, email, request), fields(user_id = %user_id, meal_plan_id = %request.meal_plan_id))]
    pub async fn create_subscription(
        &self,
        user_id: UserId,
        email: &str,
        request: NewSubscription,
    ) -> Result<Checkout, BillingError> {
        let plan = self.find_meal_plan(request.meal_plan_id).await?;

        let total_price = calculate_total_price(
            plan.price,
            request.meal_types.len(),
            request.delivery_days.len(),
        );
        let now = Utc::now();
        let id = SubscriptionId::new();
        let order_id = new_order_reference();

        let row = self
            .subscriptions
            .create(CreateSubscription {
                id: id.0,
                user_id: user_id.0,
                meal_plan_id: plan.id.0,
                name: request.name.clone(),
                phone_number: request.phone_number.clone(),
                meal_types: request.meal_types,
                delivery_days: request.delivery_days,
                allergies: request.allergies,
                total_price,
                order_id: order_id.clone(),
                status: SubscriptionStatus::Pending,
                start_date: now,
                end_date: Some(now + Duration::days(SUBSCRIPTION_PERIOD_DAYS)),
            })
            .await?;

        info!(subscription_id = %id, order_id = %order_id, total_price, "Subscription created");

        let amount = gross_amount(total_price);
        let payment_request = PaymentRequest {
            order_id,
            gross_amount: amount,
            subscription_id: id,
            customer: CustomerDetails {
                name: request.name,
                email: email.to_string(),
                phone: request.phone_number,
            },
            items: vec![LineItem {
                id: plan.id.to_string(),
                name: format!("Subscription {}", plan.name),
                price: amount,
                quantity: 1,
            }],
        };

        let payment = self
            .gateway
            .create_transaction(&payment_request)
            .await
            .inspect_err(|e| {
                warn!(subscription_id = %id, error = %e, "Payment transaction failed; subscription left pending");
            })?;

        Ok(Checkout {
            subscription: row.into(),
            payment,
        })
    }

    /// All subscriptions of a user with their meal plans, newest first.
    ///
    /// A subscription whose meal plan no longer exists fails the whole call.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user_subscriptions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SubscriptionDetails>, BillingError> {
        let rows = self.subscriptions.find_by_user_id(user_id.0).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(self.with_meal_plan(row).await?);
        }
        Ok(result)
    }

    /// Pause an active subscription, pushing its end date back by the pause
    /// duration
    #[instrument(skip(self), fields(user_id = %user_id, subscription_id = %id))]
    pub async fn pause_subscription(
        &self,
        user_id: UserId,
        id: SubscriptionId,
        window: PauseWindow,
    ) -> Result<SubscriptionDetails, BillingError> {
        let row = self.find_owned(user_id, id).await?;
        let from = row.status;
        from.apply(LifecycleEvent::Paused)?;

        let end_date = row.end_date.map(|end| window.extend(end));
        let updated = self
            .subscriptions
            .update_pause(PauseChange {
                subscription_id: row.id,
                from,
                pause_start_date: window.start(),
                pause_end_date: window.end(),
                end_date,
            })
            .await?;

        info!(
            pause_start = %window.start(),
            pause_end = %window.end(),
            "Subscription paused"
        );
        self.with_meal_plan(updated).await
    }

    /// Cancel a subscription.
    ///
    /// Cancelling an already cancelled subscription succeeds without writing.
    #[instrument(skip(self), fields(user_id = %user_id, subscription_id = %id))]
    pub async fn cancel_subscription(
        &self,
        user_id: UserId,
        id: SubscriptionId,
    ) -> Result<SubscriptionDetails, BillingError> {
        let row = self.find_owned(user_id, id).await?;

        let row = match row.status.apply(LifecycleEvent::CancelledByOwner)? {
            Transition::Changed { from, to } => {
                let updated = self
                    .subscriptions
                    .update_status(StatusChange {
                        subscription_id: row.id,
                        from,
                        to,
                    })
                    .await?;
                info!(from = %from, "Subscription cancelled");
                updated
            }
            Transition::Unchanged(_) => {
                debug!("Subscription already cancelled");
                row
            }
        };

        self.with_meal_plan(row).await
    }

    // =========================================================================
    // Gateway and scheduler
    // =========================================================================

    /// Reconcile a subscription with a payment notification.
    ///
    /// Unknown transaction statuses and events the current status does not
    /// accept are acknowledged without writing, so the gateway stops retrying.
    #[instrument(skip(self, payload))]
    pub async fn handle_payment_notification(
        &self,
        payload: &Value,
    ) -> Result<NotificationOutcome, BillingError> {
        let notification = PaymentNotification::from_value(payload)?;

        let row = self
            .subscriptions
            .find_by_order_id(&notification.order_id)
            .await?
            .ok_or(BillingError::SubscriptionNotFound)?;

        let Some(event) = notification.transaction_status.event() else {
            info!(
                order_id = %notification.order_id,
                transaction_status = %notification.transaction_status,
                "Ignoring transaction status"
            );
            return Ok(NotificationOutcome::Ignored);
        };

        match row.status.apply(event) {
            Ok(Transition::Changed { from, to }) => {
                self.subscriptions
                    .update_status(StatusChange {
                        subscription_id: row.id,
                        from,
                        to,
                    })
                    .await?;
                info!(order_id = %notification.order_id, from = %from, to = %to, "Payment notification applied");
                Ok(NotificationOutcome::Applied { from, to })
            }
            Ok(Transition::Unchanged(status)) => {
                debug!(order_id = %notification.order_id, status = %status, "Payment notification already applied");
                Ok(NotificationOutcome::Unchanged(status))
            }
            Err(rejected) => {
                warn!(order_id = %notification.order_id, error = %rejected, "Payment notification rejected");
                Ok(NotificationOutcome::Rejected(row.status))
            }
        }
    }

    /// Finish every active subscription whose end date is before `as_of`.
    ///
    /// Per-row failures are collected in the report and do not stop the
    /// sweep; only failing to list candidates is an error.
    #[instrument(skip(self))]
    pub async fn update_expired_subscriptions(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<SweepReport, BillingError> {
        let expired = self.subscriptions.find_expired_active(as_of).await?;

        let mut report = SweepReport {
            as_of,
            examined: expired.len(),
            finished: 0,
            failures: Vec::new(),
        };

        for row in expired {
            let subscription_id = SubscriptionId(row.id);
            match self.finish(&row).await {
                Ok(()) => report.finished += 1,
                Err(e) => {
                    warn!(subscription_id = %subscription_id, error = %e, "Failed to finish expired subscription");
                    report.failures.push(SweepFailure {
                        subscription_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            examined = report.examined,
            finished = report.finished,
            failed = report.failures.len(),
            "Expiry sweep complete"
        );
        Ok(report)
    }

    async fn finish(&self, row: &SubscriptionRow) -> Result<(), BillingError> {
        if let Transition::Changed { from, to } = row.status.apply(LifecycleEvent::Expired)? {
            self.subscriptions
                .update_status(StatusChange {
                    subscription_id: row.id,
                    from,
                    to,
                })
                .await?;
        }
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    async fn find_owned(
        &self,
        user_id: UserId,
        id: SubscriptionId,
    ) -> Result<SubscriptionRow, BillingError> {
        self.subscriptions
            .find_by_id_and_user_id(id.0, user_id.0)
            .await?
            .ok_or(BillingError::SubscriptionNotFound)
    }

    async fn find_meal_plan(&self, id: MealPlanId) -> Result<MealPlan, BillingError> {
        self.meal_plans
            .find_by_id(id.0)
            .await?
            .map(Into::into)
            .ok_or(BillingError::MealPlanNotFound)
    }

    async fn with_meal_plan(&self, row: SubscriptionRow) -> Result<SubscriptionDetails, BillingError> {
        let subscription: Subscription = row.into();
        let meal_plan = self
            .meal_plans
            .find_by_id(subscription.meal_plan_id.0)
            .await?
            .ok_or_else(|| {
                BillingError::Internal(format!(
                    "meal plan {} of subscription {} is missing",
                    subscription.meal_plan_id, subscription.id
                ))
            })?;

        Ok(SubscriptionDetails {
            subscription,
            meal_plan: meal_plan.into(),
        })
    }
}
