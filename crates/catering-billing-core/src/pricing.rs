//! Billing calculator

/// Weekly delivery cadence to a 30-day subscription (approximately 30 / 7)
pub const WEEKS_PER_MONTH: f64 = 4.3;

/// Total price of a subscription.
///
/// Callers guarantee non-empty meal types and delivery days; empty selections
/// yield zero.
pub fn calculate_total_price(unit_price: f64, meal_types: usize, delivery_days: usize) -> f64 {
    unit_price * meal_types as f64 * delivery_days as f64 * WEEKS_PER_MONTH
}

/// Amount sent to the gateway, truncated to whole currency units
pub fn gross_amount(total_price: f64) -> i64 {
    total_price as i64
}
