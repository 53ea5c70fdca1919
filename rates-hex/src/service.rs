//! Exchange Rate Application Service
//!
//! Read-side operations over the repository port: rate lookups and
//! foreign -> EUR conversion. Contains NO infrastructure logic.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use rates_types::domain::conversion::{convert_to_eur, display_scaled, validate_amount};
use rates_types::{
    AppError, Clock, ConversionRequest, ConversionResult, CurrencyCode, ExchangeRateDto, ExchangeRateRepository, ExchangeRateResponse, ExchangeRates,
    SupportedCurrencies,
};

/// Application service for rate queries and conversions.
///
/// Generic over `R: ExchangeRateRepository` - the adapter is injected at compile time.
/// The repository is shared with the `RateSynchronizer`, hence the `Arc`.
pub struct ExchangeRateService<R: ExchangeRateRepository> {
    repo: Arc<R>,
    currencies: SupportedCurrencies,
    clock: Arc<dyn Clock>,
}

impl<R: ExchangeRateRepository> ExchangeRateService<R> {
    /// Creates a new service over the given repository.
    pub fn new(repo: Arc<R>, currencies: SupportedCurrencies, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            currencies,
            clock,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists the configured currencies.
    pub fn available_currencies(&self) -> &[CurrencyCode] {
        self.currencies.as_slice()
    }

    /// Lists every stored row, oldest first.
    pub async fn all_exchange_rates(&self) -> Result<Vec<ExchangeRateDto>, AppError> {
        let rows = self.repo.find_all_ordered_by_date().await?;
        Ok(rows.into_iter().map(ExchangeRateDto::from).collect())
    }

    /// Gets all rates published for `date`.
    pub async fn exchange_rates(&self, date: NaiveDate) -> Result<ExchangeRateResponse, AppError> {
        self.row_for(date).await.map(ExchangeRateResponse::from)
    }

    /// Gets one currency's rate (units per 1 EUR) on `date`. The code is
    /// case-insensitive.
    pub async fn exchange_rate(
        &self,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Decimal, AppError> {
        let currency = self.supported_currency(currency)?;
        let row = self.row_for(date).await?;
        row.rate(&currency)
            .ok_or(AppError::RateNotFound { date, currency })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts a foreign amount into EUR using the rate published on the
    /// requested date.
    pub async fn convert_to_eur(&self, req: ConversionRequest) -> Result<ConversionResult, AppError> {
        let currency = self.supported_currency(&req.currency)?;
        validate_amount(req.amount)?;

        let today = self.clock.today();
        if req.date > today {
            return Err(AppError::BadRequest(format!(
                "Date {} is in the future (today is {})",
                req.date, today
            )));
        }

        let row = self.row_for(req.date).await?;
        let rate = row.rate(&currency).ok_or_else(|| AppError::RateNotFound {
            date: req.date,
            currency: currency.clone(),
        })?;

        let converted = convert_to_eur(req.amount, rate).map_err(|e| match e {
            rates_types::DomainError::ZeroRate => AppError::ZeroRate {
                date: req.date,
                currency: currency.clone(),
            },
            other => other.into(),
        })?;

        let formatted_result = format!(
            "{} {} on {} = {} EUR",
            display_scaled(req.amount, 2),
            currency,
            req.date,
            display_scaled(converted, 4)
        );

        tracing::debug!(%currency, date = %req.date, %rate, %converted, "Converted to EUR");

        Ok(ConversionResult {
            from_currency: currency,
            original_amount: req.amount,
            date: req.date,
            converted_amount: converted,
            rate,
            formatted_result,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    /// Parses a requested code and checks it against the configured list.
    fn supported_currency(&self, code: &str) -> Result<CurrencyCode, AppError> {
        let currency = CurrencyCode::parse(code)?;
        if !self.currencies.contains(&currency) {
            return Err(AppError::UnsupportedCurrency(currency.to_string()));
        }
        Ok(currency)
    }

    async fn row_for(&self, date: NaiveDate) -> Result<ExchangeRates, AppError> {
        self.repo
            .find_by_date(date)
            .await?
            .ok_or(AppError::DateNotFound(date))
    }
}
