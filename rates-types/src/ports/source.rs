//! Rate source port.
//!
//! This trait defines the interface for the upstream statistics API.
//! Implementations can be HTTP clients, mock providers, etc.

use chrono::NaiveDate;

use crate::domain::{CurrencyCode, CurrencyRates};

/// Date range requested from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRange {
    /// Inclusive `start..=end`.
    Between { start: NaiveDate, end: NaiveDate },
    /// Everything the source has ever published.
    FullHistory,
}

impl FetchRange {
    pub fn single_day(date: NaiveDate) -> Self {
        FetchRange::Between {
            start: date,
            end: date,
        }
    }
}

/// Error type for a single currency fetch.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Port trait for reference rate sources.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync + 'static {
    /// Fetches the EUR reference rates of one currency for a date range.
    async fn fetch_rates(
        &self,
        currency: &CurrencyCode,
        range: FetchRange,
    ) -> Result<CurrencyRates, SourceError>;
}
