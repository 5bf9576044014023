//! Daily expiry sweep
//!
//! Finishes active subscriptions past their end date at every UTC midnight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use tokio::task::JoinHandle;

use crate::state::Subscriptions;

/// Spawn the sweep loop on the current runtime
pub fn spawn_expiry_sweep(subscriptions: Arc<Subscriptions>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next_midnight(Utc::now());
            tracing::debug!(wait_secs = wait.as_secs(), "Next expiry sweep scheduled");
            tokio::time::sleep(wait).await;

            run_sweep(&subscriptions).await;
        }
    })
}

async fn run_sweep(subscriptions: &Subscriptions) {
    match subscriptions.update_expired_subscriptions(Utc::now()).await {
        Ok(report) => {
            metrics::counter!("catering_sweep_finished_total").increment(report.finished as u64);
            metrics::counter!("catering_sweep_failures_total")
                .increment(report.failures.len() as u64);

            if report.is_clean() {
                tracing::info!(
                    examined = report.examined,
                    finished = report.finished,
                    "Expiry sweep finished"
                );
            } else {
                for failure in &report.failures {
                    tracing::error!(
                        subscription_id = %failure.subscription_id,
                        error = %failure.error,
                        "Subscription left unfinished by expiry sweep"
                    );
                }
            }
        }
        Err(e) => {
            metrics::counter!("catering_sweep_failures_total").increment(1);
            tracing::error!(error = %e, "Expiry sweep could not list expired subscriptions");
        }
    }
}

/// Time from `now` until the next 00:00:00 UTC
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc());

    match next {
        Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
        None => Duration::from_secs(24 * 60 * 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_until_next_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(30 * 60));

        let midnight = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(until_next_midnight(midnight), Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_until_next_midnight_crosses_year() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(12 * 60 * 60));
    }
}
