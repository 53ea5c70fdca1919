//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) implement this trait.

use chrono::NaiveDate;

use crate::domain::ExchangeRates;
use crate::error::RepoError;

/// Storage of one rate row per date.
///
/// Rows are immutable: `save` never overwrites an existing date.
#[async_trait::async_trait]
pub trait ExchangeRateRepository: Send + Sync + 'static {
    /// Gets the row for a date.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ExchangeRates>, RepoError>;

    /// Lists all rows, oldest first.
    async fn find_all_ordered_by_date(&self) -> Result<Vec<ExchangeRates>, RepoError>;

    /// Returns true if a row exists for the date.
    async fn exists_by_date(&self, date: NaiveDate) -> Result<bool, RepoError>;

    /// Number of stored rows.
    async fn count(&self) -> Result<i64, RepoError>;

    /// Inserts the row unless one already exists for its date.
    ///
    /// The existence check and the write MUST be atomic. Returns `true` if
    /// the row was written, `false` if the date was already present.
    async fn save(&self, rates: ExchangeRates) -> Result<bool, RepoError>;
}
