//! Shared handler utilities
//!
//! Request validation, extractor rejection mapping, and metrics helpers used
//! across handlers.

use std::collections::HashSet;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Subscriber name bounds (characters)
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;

/// Phone number bounds (characters); the column is `VARCHAR(20)`
pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 20;

/// Maximum length for free-text allergy notes
pub const MAX_ALLERGIES_LEN: usize = 256;

/// Meal plan name bounds (characters)
pub const PLAN_NAME_MIN_LEN: usize = 3;
pub const PLAN_NAME_MAX_LEN: usize = 255;

/// Validate that a string's character count is within `min..=max`.
pub fn validate_length(value: &str, field: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(ApiError::BadRequest(format!(
            "{field} must be at least {min} characters"
        )));
    }
    if len > max {
        return Err(ApiError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate a phone number: 10 to 20 characters of digits, with an optional
/// leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ApiError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let len = phone.chars().count();

    if len < PHONE_MIN_LEN {
        return Err(ApiError::BadRequest(format!(
            "phone_number must be at least {PHONE_MIN_LEN} characters"
        )));
    }
    if len > PHONE_MAX_LEN {
        return Err(ApiError::BadRequest(format!(
            "phone_number must be at most {PHONE_MAX_LEN} characters"
        )));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "phone_number may only contain digits".into(),
        ));
    }
    Ok(())
}

/// Validate a selection list (meal types, delivery days): non-empty, no
/// blank entries, no duplicates (case-insensitive).
pub fn validate_selection(values: &[String], field: &str) -> Result<(), ApiError> {
    if values.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} cannot be empty")));
    }

    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "{field} cannot contain blank entries"
            )));
        }
        if !seen.insert(normalized) {
            return Err(ApiError::BadRequest(format!(
                "{field} contains duplicate entry: {value}"
            )));
        }
    }
    Ok(())
}

/// Validate optional allergy notes.
pub fn validate_allergies(allergies: Option<&str>) -> Result<(), ApiError> {
    match allergies {
        Some(text) if text.chars().count() > MAX_ALLERGIES_LEN => Err(ApiError::BadRequest(
            format!("allergies too long (max {MAX_ALLERGIES_LEN} chars)"),
        )),
        _ => Ok(()),
    }
}

/// Validate an absolute http(s) URL.
pub fn validate_url(value: &str, field: &str) -> Result<(), ApiError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') && !value.contains(' ') => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "{field} must be an absolute http(s) URL"
        ))),
    }
}

// ============================================================================
// Extractor Rejections
// ============================================================================

/// Unwrap a JSON body, turning axum's rejection into our error envelope.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwrap a path parameter.
pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwrap query parameters.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "catering_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Tests
// ============================================================================
