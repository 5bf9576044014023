//! Subscription handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catering_billing_core::{BillingError, NewSubscription};
use catering_types::{MealPlanId, PauseWindow, SubscriptionDetails, SubscriptionId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{
    json_body, path_param, record_op_duration, validate_allergies, validate_length,
    validate_phone, validate_selection, NAME_MAX_LEN, NAME_MIN_LEN,
};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub name: String,
    pub phone_number: String,
    pub meal_plan_id: MealPlanId,
    pub meal_types: Vec<String>,
    pub delivery_days: Vec<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Validate field constraints and normalize whitespace
    pub fn validate(self) -> Result<NewSubscription, ApiError> {
        validate_length(&self.name, "name", NAME_MIN_LEN, NAME_MAX_LEN)?;
        validate_phone(self.phone_number.trim())?;
        validate_selection(&self.meal_types, "meal_types")?;
        validate_selection(&self.delivery_days, "delivery_days")?;
        validate_allergies(self.allergies.as_deref())?;

        Ok(NewSubscription {
            meal_plan_id: self.meal_plan_id,
            name: self.name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            meal_types: trimmed(self.meal_types),
            delivery_days: trimmed(self.delivery_days),
            allergies: self
                .allergies
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        })
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.trim().to_string()).collect()
}

#[derive(Debug, Deserialize)]
pub struct PauseSubscriptionRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PauseSubscriptionRequest {
    /// The requested window; the end must fall after the start
    pub fn window(&self) -> ApiResult<PauseWindow> {
        Ok(PauseWindow::new(self.start_date, self.end_date).map_err(BillingError::from)?)
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub token: String,
    pub redirect_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    let start = Instant::now();
    let request = json_body(body)?.validate()?;

    let result = state
        .subscriptions
        .create_subscription(user.user_id, &user.email, request)
        .await;
    record_op_duration("create_subscription", start, result.is_ok());
    let checkout = result?;

    metrics::counter!("catering_subscriptions_created_total").increment(1);
    tracing::info!(
        user_id = %user.user_id,
        subscription_id = %checkout.subscription.id,
        order_id = %checkout.subscription.order_id,
        "Subscription created"
    );

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            token: checkout.payment.token,
            redirect_url: checkout.payment.redirect_url,
        }),
    ))
}

/// GET /api/v1/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<SubscriptionDetails>>> {
    let start = Instant::now();

    let result = state
        .subscriptions
        .get_user_subscriptions(user.user_id)
        .await;
    record_op_duration("list_subscriptions", start, result.is_ok());

    Ok(Json(result?))
}

/// PUT /api/v1/subscriptions/{id}/pause
pub async fn pause_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<SubscriptionId>, PathRejection>,
    body: Result<Json<PauseSubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<SubscriptionDetails>> {
    let start = Instant::now();
    let id = path_param(id)?;
    let window = json_body(body)?.window()?;

    let result = state
        .subscriptions
        .pause_subscription(user.user_id, id, window)
        .await;
    record_op_duration("pause_subscription", start, result.is_ok());
    let details = result?;

    metrics::counter!("catering_subscriptions_paused_total").increment(1);
    Ok(Json(details))
}

/// DELETE /api/v1/subscriptions/{id}
pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<SubscriptionId>, PathRejection>,
) -> ApiResult<Json<SubscriptionDetails>> {
    let start = Instant::now();
    let id = path_param(id)?;

    let result = state
        .subscriptions
        .cancel_subscription(user.user_id, id)
        .await;
    record_op_duration("cancel_subscription", start, result.is_ok());
    let details = result?;

    metrics::counter!("catering_subscriptions_cancelled_total").increment(1);
    Ok(Json(details))
}
