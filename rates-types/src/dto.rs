//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, ExchangeRates};

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// All rates published for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    /// Currency code -> units of that currency per 1 EUR
    #[schema(value_type = BTreeMap<String, String>)]
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl From<ExchangeRates> for ExchangeRateResponse {
    fn from(row: ExchangeRates) -> Self {
        Self {
            date: row.date,
            rates: row.rates,
        }
    }
}

/// Entry of the full rate history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateDto {
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    /// 1 EUR = X units of each currency
    #[schema(value_type = BTreeMap<String, String>)]
    pub eur_to_foreign_rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRateDto {
    pub fn rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.eur_to_foreign_rates.get(currency).copied()
    }
}

impl From<ExchangeRates> for ExchangeRateDto {
    fn from(row: ExchangeRates) -> Self {
        Self {
            date: row.date,
            eur_to_foreign_rates: row.rates,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert a foreign amount into EUR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionRequest {
    /// Three-letter code of the source currency
    #[schema(example = "USD")]
    pub currency: String,
    /// Positive amount with at most 2 fraction digits
    #[schema(value_type = String, example = "110.00")]
    pub amount: Decimal,
    /// Reference date (today or earlier)
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
}

/// Result of a conversion into EUR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResult {
    pub from_currency: CurrencyCode,
    #[schema(value_type = String, example = "110.00")]
    pub original_amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    /// EUR amount, 4 fraction digits
    #[schema(value_type = String, example = "100.0000")]
    pub converted_amount: Decimal,
    /// EUR -> currency rate used
    #[schema(value_type = String, example = "1.1000")]
    pub rate: Decimal,
    #[schema(example = "110.00 USD on 2024-01-02 = 100.0000 EUR")]
    pub formatted_result: String,
}
