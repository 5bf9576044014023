//! Meal plan catalog handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catering_billing_core::NewMealPlan;
use catering_types::{MealPlan, MealPlanId};
use serde::Deserialize;
use std::time::Instant;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{
    json_body, path_param, record_op_duration, validate_length, validate_url, PLAN_NAME_MAX_LEN,
    PLAN_NAME_MIN_LEN,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMealPlanRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
}

impl CreateMealPlanRequest {
    pub fn validate(self) -> Result<NewMealPlan, ApiError> {
        validate_length(&self.name, "name", PLAN_NAME_MIN_LEN, PLAN_NAME_MAX_LEN)?;
        if self.description.trim().is_empty() {
            return Err(ApiError::BadRequest("description cannot be empty".into()));
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(ApiError::BadRequest("price must be greater than 0".into()));
        }
        validate_url(&self.photo_url, "photo_url")?;

        Ok(NewMealPlan {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            photo_url: self.photo_url,
        })
    }
}

/// GET /api/v1/meal-plans
pub async fn list_meal_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<MealPlan>>> {
    let start = Instant::now();

    let result = state.catalog.list().await;
    record_op_duration("list_meal_plans", start, result.is_ok());

    let plans = result?;
    Ok(Json(plans.as_slice().to_vec()))
}

/// GET /api/v1/meal-plans/{id}
pub async fn get_meal_plan(
    State(state): State<AppState>,
    id: Result<Path<MealPlanId>, PathRejection>,
) -> ApiResult<Json<MealPlan>> {
    let start = Instant::now();
    let id = path_param(id)?;

    let result = state.catalog.get(id).await;
    record_op_duration("get_meal_plan", start, result.is_ok());

    Ok(Json(result?))
}

/// POST /api/v1/meal-plans
pub async fn create_meal_plan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    body: Result<Json<CreateMealPlanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MealPlan>)> {
    let start = Instant::now();
    let plan = json_body(body)?.validate()?;

    let result = state.catalog.create(plan).await;
    record_op_duration("create_meal_plan", start, result.is_ok());
    let plan = result?;

    tracing::info!(meal_plan_id = %plan.id, admin = %admin.user_id, "Meal plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: f64, photo_url: &str) -> CreateMealPlanRequest {
        CreateMealPlanRequest {
            name: "Diet Plan".into(),
            description: "Low calorie, high protein".into(),
            price,
            photo_url: photo_url.into(),
        }
    }

    #[test]
    fn test_validate_meal_plan() {
        let plan = request(30_000.0, "https://cdn.example.com/diet.jpg")
            .validate()
            .unwrap();
        assert_eq!(plan.name, "Diet Plan");

        assert!(request(0.0, "https://cdn.example.com/diet.jpg").validate().is_err());
        assert!(request(f64::NAN, "https://cdn.example.com/diet.jpg").validate().is_err());
        assert!(request(30_000.0, "diet.jpg").validate().is_err());

        let mut blank = request(30_000.0, "https://cdn.example.com/diet.jpg");
        blank.description = "  ".into();
        assert!(blank.validate().is_err());
    }
}
