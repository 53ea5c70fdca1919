//! # Rates Hex
//!
//! Application service layer and HTTP adapter for the exchange rate service.
//!
//! ## Architecture
//!
//! - `service/` - Query and conversion operations over the repository port
//! - `sync/` - Backfill and daily top-up from a `RateSource`
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Both the service and the synchronizer are generic over
//! `R: ExchangeRateRepository`, allowing different repository
//! implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;
pub mod sync;

#[cfg(test)]
mod service_tests;

pub use service::ExchangeRateService;
pub use sync::{RateSynchronizer, SyncError, SyncOutcome, SyncReport};
