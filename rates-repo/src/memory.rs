//! In-memory repository adapter backed by `DashMap`.
//!
//! Used by tests and for running the service without a database.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use rates_types::{ExchangeRateRepository, ExchangeRates, RepoError};

#[derive(Default)]
pub struct InMemoryRepo {
    rows: DashMap<NaiveDate, ExchangeRates>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-populated with `rows` (later duplicates are ignored).
    pub fn with_rows(rows: impl IntoIterator<Item = ExchangeRates>) -> Self {
        let repo = Self::new();
        for row in rows {
            repo.rows.entry(row.date).or_insert(row);
        }
        repo
    }
}

#[async_trait]
impl ExchangeRateRepository for InMemoryRepo {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ExchangeRates>, RepoError> {
        Ok(self.rows.get(&date).map(|r| r.value().clone()))
    }

    async fn find_all_ordered_by_date(&self) -> Result<Vec<ExchangeRates>, RepoError> {
        let mut all: Vec<ExchangeRates> = self.rows.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.date);
        Ok(all)
    }

    async fn exists_by_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
        Ok(self.rows.contains_key(&date))
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.rows.len() as i64)
    }

    async fn save(&self, rates: ExchangeRates) -> Result<bool, RepoError> {
        match self.rows.entry(rates.date) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(rates);
                Ok(true)
            }
        }
    }
}
