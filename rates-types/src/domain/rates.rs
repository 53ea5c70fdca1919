//! Per-currency decoded rates and the persisted per-date rate row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::currency::CurrencyCode;

/// Rates for a single currency, keyed by date (1 EUR = X currency).
pub type CurrencyRates = BTreeMap<NaiveDate, Decimal>;

/// All reference rates published for one date.
///
/// At most one of these exists per date in storage; it is always written
/// as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRates {
    /// Reference date
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    /// Currency code -> units of that currency per 1 EUR
    #[schema(value_type = BTreeMap<String, String>)]
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRates {
    pub fn new(date: NaiveDate, rates: BTreeMap<CurrencyCode, Decimal>) -> Self {
        Self { date, rates }
    }

    /// Returns the EUR -> `currency` rate, if one was published for this date.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }
}
