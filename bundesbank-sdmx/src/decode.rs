//! Payload decoder: positional SDMX observations -> `date -> rate`.
//!
//! Malformed observations are classified per entry and dropped; only a
//! missing top-level structure yields an empty result. Nothing here logs or
//! fails, which keeps the decoder a pure function of the payload.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use rates_types::CurrencyRates;

use crate::sdmx::SdmxResponse;

/// Why an observation was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Key is not a non-negative integer.
    InvalidIndex,
    /// Key points past the end of the time period list.
    IndexOutOfRange,
    /// Value list empty or its first element null.
    MissingValue,
    /// Time period is not an ISO calendar date.
    InvalidDate,
    /// Value is not a decimal number.
    InvalidRate,
}

/// Classification of a single observation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Decoded { date: NaiveDate, rate: Decimal },
    Skipped(SkipReason),
}

/// Decoded rates plus how many observations were dropped, by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub rates: CurrencyRates,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl DecodeOutcome {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Decodes the first series of the first dataset.
pub fn decode(response: &SdmxResponse) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();

    let Some(data) = response.data.as_ref() else {
        return outcome;
    };
    let Some(data_set) = data.data_sets.first() else {
        return outcome;
    };
    let Some((_, series)) = data_set.series.first() else {
        return outcome;
    };
    if series.observations.is_empty() {
        return outcome;
    }

    let time_periods = data.time_periods();
    for (index_key, values) in &series.observations {
        let values = values.as_deref().unwrap_or_default();
        match decode_observation(index_key, values, &time_periods) {
            Observation::Decoded { date, rate } => {
                outcome.rates.insert(date, rate);
            }
            Observation::Skipped(reason) => {
                *outcome.skipped.entry(reason).or_default() += 1;
            }
        }
    }

    outcome
}

/// Classifies one `(index, values)` observation against the time periods.
pub fn decode_observation(index_key: &str, values: &[Value], time_periods: &[&str]) -> Observation {
    let Ok(index) = index_key.parse::<usize>() else {
        return Observation::Skipped(SkipReason::InvalidIndex);
    };
    let Some(period) = time_periods.get(index) else {
        return Observation::Skipped(SkipReason::IndexOutOfRange);
    };
    let value = match values.first() {
        None | Some(Value::Null) => return Observation::Skipped(SkipReason::MissingValue),
        Some(value) => value,
    };
    let Ok(date) = NaiveDate::parse_from_str(period, "%Y-%m-%d") else {
        return Observation::Skipped(SkipReason::InvalidDate);
    };
    match parse_rate(value) {
        Some(rate) => Observation::Decoded { date, rate },
        None => Observation::Skipped(SkipReason::InvalidRate),
    }
}

fn parse_rate(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
