//! Midtrans payment notification handler

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use catering_billing_core::PaymentNotification;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    /// applied, unchanged, ignored or rejected
    pub status: &'static str,
}

/// POST /api/v1/subscriptions/webhook/midtrans
///
/// Unauthenticated; when signature verification is enabled the payload must
/// carry a valid `signature_key`.
pub async fn midtrans_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<NotificationResponse>> {
    let start = Instant::now();

    let result = process(&state, &body).await;
    record_op_duration("process_webhook", start, result.is_ok());

    match result {
        Ok(status) => {
            metrics::counter!("catering_webhooks_processed_total", "status" => status)
                .increment(1);
            Ok(Json(NotificationResponse { status }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Payment notification not processed");
            metrics::counter!("catering_webhooks_processed_total", "status" => "error")
                .increment(1);
            Err(e)
        }
    }
}

async fn process(state: &AppState, body: &[u8]) -> ApiResult<&'static str> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid notification body: {e}")))?;

    if let Some(verifier) = &state.notifications {
        verifier.verify(&PaymentNotification::from_value(&payload)?)?;
    }

    let outcome = state
        .subscriptions
        .handle_payment_notification(&payload)
        .await?;

    Ok(outcome.as_str())
}
