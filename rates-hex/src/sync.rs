//! Rate Synchronizer
//!
//! Pulls reference rates from a `RateSource` into the repository:
//! a one-off historical backfill into empty storage and a daily top-up
//! for today's date. Both are idempotent; rows are only ever inserted.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use rates_types::domain::merge_currency_results;
use rates_types::{
    Clock, CurrencyCode, ExchangeRateRepository, FetchRange, RateSource, RateTable, RepoError,
    SupportedCurrencies,
};

/// Why a synchronization run was aborted.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("All {attempted} currency fetches failed")]
    AllSourcesFailed { attempted: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dates_received: usize,
    pub rows_written: usize,
    pub rows_already_present: usize,
    pub failed_currencies: Vec<CurrencyCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to do: storage already had the data.
    Skipped,
    Completed(SyncReport),
}

/// Keeps the repository in step with the upstream source.
pub struct RateSynchronizer<R: ExchangeRateRepository, S: RateSource> {
    repo: Arc<R>,
    source: Arc<S>,
    currencies: SupportedCurrencies,
    clock: Arc<dyn Clock>,
}

impl<R: ExchangeRateRepository, S: RateSource> RateSynchronizer<R, S> {
    pub fn new(
        repo: Arc<R>,
        source: Arc<S>,
        currencies: SupportedCurrencies,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            source,
            currencies,
            clock,
        }
    }

    /// Imports the full published history, but only into empty storage.
    #[instrument(skip(self), fields(currencies = self.currencies.len()))]
    pub async fn import_all_historical_data(&self) -> Result<SyncOutcome, SyncError> {
        let existing = self.repo.count().await?;
        if existing > 0 {
            info!(existing, "Storage already populated, skipping historical import");
            return Ok(SyncOutcome::Skipped);
        }

        info!("Importing full rate history");
        let (table, failed) = self.fetch_table(FetchRange::FullHistory).await?;
        let report = self.write_table(table, failed).await?;

        info!(
            dates = report.dates_received,
            written = report.rows_written,
            failed = report.failed_currencies.len(),
            "Historical import finished"
        );
        Ok(SyncOutcome::Completed(report))
    }

    /// Fetches and stores today's rates unless a row for today already exists.
    #[instrument(skip(self), fields(today = %self.clock.today()))]
    pub async fn fetch_and_store_current_rates_if_missing(
        &self,
    ) -> Result<SyncOutcome, SyncError> {
        let today = self.clock.today();
        if self.repo.exists_by_date(today).await? {
            info!("Rates for today already stored");
            return Ok(SyncOutcome::Skipped);
        }

        let (table, failed) = self.fetch_table(FetchRange::single_day(today)).await?;
        if table.get(&today).is_none() {
            // Weekends, holidays, or before the daily publication.
            info!("No rates published for today yet");
        }
        let report = self.write_table(table, failed).await?;

        info!(
            dates = report.dates_received,
            written = report.rows_written,
            failed = report.failed_currencies.len(),
            "Daily update finished"
        );
        Ok(SyncOutcome::Completed(report))
    }

    /// Fetches every supported currency concurrently and merges the results.
    ///
    /// Individual failures are logged and excluded; the run only fails when
    /// no currency could be fetched at all.
    async fn fetch_table(
        &self,
        range: FetchRange,
    ) -> Result<(RateTable, Vec<CurrencyCode>), SyncError> {
        let fetches = self.currencies.iter().map(|currency| async move {
            let result = self.source.fetch_rates(currency, range).await;
            (currency.clone(), result)
        });
        let outcome = merge_currency_results(join_all(fetches).await);

        for (currency, err) in &outcome.failed {
            warn!(%currency, error = %err, "Failed to fetch rates");
        }

        let attempted = self.currencies.len();
        if attempted > 0 && outcome.succeeded(attempted) == 0 {
            return Err(SyncError::AllSourcesFailed { attempted });
        }

        let failed = outcome.failed.into_iter().map(|(c, _)| c).collect();
        Ok((outcome.table, failed))
    }

    async fn write_table(
        &self,
        table: RateTable,
        failed_currencies: Vec<CurrencyCode>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            dates_received: table.len(),
            failed_currencies,
            ..SyncReport::default()
        };

        for row in table.into_rows() {
            if self.repo.save(row).await? {
                report.rows_written += 1;
            } else {
                report.rows_already_present += 1;
            }
        }

        Ok(report)
    }
}
