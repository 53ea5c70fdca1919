//! Shared database row types and row -> domain conversion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;

use rates_types::{CurrencyCode, ExchangeRates, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// One `exchange_rates LEFT JOIN currency_rates` row (SQLite stores dates as text).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateEntry {
    pub date: String,
    pub currency_code: Option<String>,
    pub rate: Option<String>,
}

#[cfg(feature = "sqlite")]
impl SqliteRateEntry {
    pub fn into_parts(self) -> Result<RateEntry, RepoError> {
        Ok(RateEntry {
            date: parse_date(&self.date)?,
            currency_code: self.currency_code,
            rate: self.rate,
        })
    }
}

/// One `exchange_rates LEFT JOIN currency_rates` row (rate selected as text).
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateEntry {
    pub date: NaiveDate,
    pub currency_code: Option<String>,
    pub rate: Option<String>,
}

#[cfg(feature = "postgres")]
impl PgRateEntry {
    pub fn into_parts(self) -> Result<RateEntry, RepoError> {
        Ok(RateEntry {
            date: self.date,
            currency_code: self.currency_code,
            rate: self.rate,
        })
    }
}

/// Backend-neutral joined row.
pub struct RateEntry {
    pub date: NaiveDate,
    pub currency_code: Option<String>,
    pub rate: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_date(s: &str) -> Result<NaiveDate, RepoError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RepoError::Corrupt(format!("Invalid date {s:?}: {e}")))
}

pub fn parse_rate(s: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(s.trim()).map_err(|e| RepoError::Corrupt(format!("Invalid rate {s:?}: {e}")))
}

pub fn parse_currency(s: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::parse(s.trim()).map_err(|e| RepoError::Corrupt(e.to_string()))
}

/// Groups joined rows (ordered by date) into one `ExchangeRates` per date.
pub fn group_entries(
    entries: impl IntoIterator<Item = RateEntry>,
) -> Result<Vec<ExchangeRates>, RepoError> {
    let mut grouped: BTreeMap<NaiveDate, BTreeMap<CurrencyCode, Decimal>> = BTreeMap::new();

    for entry in entries {
        let rates = grouped.entry(entry.date).or_default();
        if let (Some(code), Some(rate)) = (entry.currency_code, entry.rate) {
            rates.insert(parse_currency(&code)?, parse_rate(&rate)?);
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(date, rates)| ExchangeRates::new(date, rates))
        .collect())
}
