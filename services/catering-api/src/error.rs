//! Error types for the Catering API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catering_billing_core::BillingError;
use serde::Serialize;
use serde_json::json;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Billing(#[from] BillingError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Billing(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Billing(e) if e.is_bad_request() => StatusCode::BAD_REQUEST,
            Self::Billing(BillingError::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Billing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Billing(BillingError::MealPlanNotFound) => "MEAL_PLAN_NOT_FOUND",
            Self::Billing(BillingError::SubscriptionNotFound) => "SUBSCRIPTION_NOT_FOUND",
            Self::Billing(BillingError::InvalidSignature) => "INVALID_SIGNATURE",
            Self::Billing(e) if e.is_bad_request() => "BAD_REQUEST",
            Self::Billing(BillingError::InvalidTransition(_)) => "INVALID_STATUS_TRANSITION",
            Self::Billing(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Billing(BillingError::InvalidTransition(t)) => Some(json!({
                "status": t.from,
                "event": t.event,
            })),
            _ => None,
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors; their messages stay out of the response
        let message = if self.is_internal() {
            tracing::error!(error = ?self, "Internal API error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
