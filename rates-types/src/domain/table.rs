//! Unified date -> currency -> rate table and the per-currency merge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::currency::CurrencyCode;
use super::rates::{CurrencyRates, ExchangeRates};

/// Rates from every fetched currency, grouped by date.
///
/// A date that is missing from one currency's results simply has no entry
/// for that currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable(BTreeMap<NaiveDate, BTreeMap<CurrencyCode, Decimal>>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one currency's decoded rates into the table.
    pub fn absorb(&mut self, currency: &CurrencyCode, rates: CurrencyRates) {
        for (date, rate) in rates {
            self.0.entry(date).or_default().insert(currency.clone(), rate);
        }
    }

    /// Union of two tables. Tables built from disjoint currencies never
    /// collide, which makes the merge order irrelevant.
    pub fn merge(mut self, other: RateTable) -> RateTable {
        for (date, rates) in other.0 {
            self.0.entry(date).or_default().extend(rates);
        }
        self
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&BTreeMap<CurrencyCode, Decimal>> {
        self.0.get(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the table, yielding one row per date in ascending order.
    pub fn into_rows(self) -> impl Iterator<Item = ExchangeRates> {
        self.0
            .into_iter()
            .map(|(date, rates)| ExchangeRates::new(date, rates))
    }
}

/// Result of merging independent per-currency fetch attempts.
#[derive(Debug)]
pub struct MergeOutcome<E> {
    pub table: RateTable,
    pub failed: Vec<(CurrencyCode, E)>,
}

impl<E> MergeOutcome<E> {
    /// Attempts that did not fail; never below zero.
    pub fn succeeded(&self, attempted: usize) -> usize {
        attempted.saturating_sub(self.failed.len())
    }
}

/// Merges per-currency results; failures are collected, never fatal.
pub fn merge_currency_results<E>(
    results: impl IntoIterator<Item = (CurrencyCode, Result<CurrencyRates, E>)>,
) -> MergeOutcome<E> {
    let mut table = RateTable::new();
    let mut failed = Vec::new();

    for (currency, result) in results {
        match result {
            Ok(rates) => table.absorb(&currency, rates),
            Err(e) => failed.push((currency, e)),
        }
    }

    MergeOutcome { table, failed }
}
