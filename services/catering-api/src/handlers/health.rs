//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub expiry_sweep: bool,
    pub signature_verification: bool,
}

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe; 503 until the database answers
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, (StatusCode, Json<ReadyResponse>)> {
    let mut response = ReadyResponse {
        status: "ready",
        database: "connected",
        expiry_sweep: state.config.sweep_enabled,
        signature_verification: state.notifications.is_some(),
    };

    if let Err(e) = sqlx::query("SELECT 1").execute(&state.pool).await {
        tracing::error!(error = ?e, "Database readiness check failed");
        response.status = "unavailable";
        response.database = "disconnected";
        return Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)));
    }

    Ok(Json(response))
}
