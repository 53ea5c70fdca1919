//! Error types for the exchange rate service.

use chrono::NaiveDate;

use crate::domain::CurrencyCode;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?} (expected three letters)")]
    InvalidCurrencyCode(String),

    #[error("Cannot convert with zero exchange rate")]
    ZeroRate,

    #[error("Conversion result out of range")]
    ConversionOverflow,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("No exchange rates found for date {0}")]
    DateNotFound(NaiveDate),

    #[error("No rate available for currency {currency} on {date}")]
    RateNotFound {
        date: NaiveDate,
        currency: CurrencyCode,
    },

    #[error("Cannot convert {currency} on {date}: exchange rate is zero")]
    ZeroRate {
        date: NaiveDate,
        currency: CurrencyCode,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            AppError::DateNotFound(_) => "RATE_NOT_FOUND",
            AppError::RateNotFound { .. } => "CURRENCY_RATE_NOT_FOUND",
            AppError::ZeroRate { .. } => "ZERO_EXCHANGE_RATE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::Internal(e.to_string()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Corrupt(e) => AppError::Internal(e),
        }
    }
}
