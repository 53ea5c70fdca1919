//! # Rates Types
//!
//! Domain types and port traits for the exchange rate service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, CurrencyRates, RateTable, ExchangeRates)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CurrencyCode, CurrencyRates, ExchangeRates, MergeOutcome, RateTable, SupportedCurrencies,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    Clock, ExchangeRateRepository, FetchRange, FixedClock, RateSource, SourceError, SystemClock,
};
