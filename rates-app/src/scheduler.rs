//! Background scheduler for rate synchronization.
//!
//! Runs the historical backfill and an eager top-up at startup, then the
//! top-up once a day at the configured UTC time.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use rates_hex::{RateSynchronizer, SyncOutcome};
use rates_types::{ExchangeRateRepository, RateSource};

/// Starts the background synchronization task.
pub fn start_rate_sync_scheduler<R, S>(
    sync: RateSynchronizer<R, S>,
    update_time: NaiveTime,
) -> JoinHandle<()>
where
    R: ExchangeRateRepository,
    S: RateSource,
{
    tokio::spawn(async move {
        info!(%update_time, "Rate sync scheduler started (daily, UTC)");

        match sync.import_all_historical_data().await {
            Ok(outcome) => log_outcome("Historical import", &outcome),
            Err(e) => error!(error = %e, "Historical import failed"),
        }
        run_daily_update(&sync).await;

        loop {
            let wait = until_next(Utc::now().naive_utc(), update_time);
            debug!(wait_secs = wait.as_secs(), "Sleeping until next daily update");
            tokio::time::sleep(wait).await;
            run_daily_update(&sync).await;
        }
    })
}

async fn run_daily_update<R, S>(sync: &RateSynchronizer<R, S>)
where
    R: ExchangeRateRepository,
    S: RateSource,
{
    match sync.fetch_and_store_current_rates_if_missing().await {
        Ok(outcome) => log_outcome("Daily update", &outcome),
        Err(e) => error!(error = %e, "Daily update failed"),
    }
}

fn log_outcome(run: &str, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Skipped => debug!("{run} skipped"),
        SyncOutcome::Completed(report) => info!(
            written = report.rows_written,
            present = report.rows_already_present,
            failed = ?report.failed_currencies,
            "{run} completed"
        ),
    }
}

/// Time from `now` until the next occurrence of `at` (strictly in the future).
pub fn until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today_at = now.date().and_time(at);
    let next = if today_at > now {
        today_at
    } else {
        today_at + TimeDelta::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}
