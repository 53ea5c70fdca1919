//! Domain models for the exchange rate service.

pub mod conversion;
pub mod currency;
pub mod rates;
pub mod table;

pub use currency::{CurrencyCode, SupportedCurrencies};
pub use rates::{CurrencyRates, ExchangeRates};
pub use table::{MergeOutcome, RateTable, merge_currency_results};
