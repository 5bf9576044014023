//! Admin statistics handlers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use catering_billing_core::DateRange;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::handlers::shared::{query_params, record_op_duration};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub start_date: String,
    pub end_date: String,
}

impl StatsQuery {
    fn range(&self) -> ApiResult<DateRange> {
        Ok(DateRange::parse(&self.start_date, &self.end_date)?)
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MrrResponse {
    pub mrr: f64,
}

/// GET /api/v1/subscriptions/admin/stats/new
pub async fn new_subscriptions_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<CountResponse>> {
    let start = Instant::now();
    let range = query_params(query)?.range()?;

    let result = state.subscriptions.new_subscriptions_count(range).await;
    record_op_duration("stats_new", start, result.is_ok());

    Ok(Json(CountResponse { count: result? }))
}

/// GET /api/v1/subscriptions/admin/stats/mrr
pub async fn mrr_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<MrrResponse>> {
    let start = Instant::now();
    let range = query_params(query)?.range()?;

    let result = state.subscriptions.monthly_recurring_revenue(range).await;
    record_op_duration("stats_mrr", start, result.is_ok());

    Ok(Json(MrrResponse { mrr: result? }))
}

/// GET /api/v1/subscriptions/admin/stats/reactivations
pub async fn reactivation_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<CountResponse>> {
    let start = Instant::now();
    let range = query_params(query)?.range()?;

    let result = state.subscriptions.reactivation_count(range).await;
    record_op_duration("stats_reactivations", start, result.is_ok());

    Ok(Json(CountResponse { count: result? }))
}

/// GET /api/v1/subscriptions/admin/stats/active-total
pub async fn active_total_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<CountResponse>> {
    let start = Instant::now();

    let result = state.subscriptions.total_active_subscriptions().await;
    record_op_duration("stats_active_total", start, result.is_ok());

    Ok(Json(CountResponse { count: result? }))
}
