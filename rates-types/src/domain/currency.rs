//! Currency codes and the configured set of supported currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// ISO-4217 style currency code: three ASCII letters, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "USD")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a code case-insensitively, normalising it to uppercase.
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// The configured currencies fetched from the source and accepted by queries.
///
/// Order follows configuration; duplicates are dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportedCurrencies(Vec<CurrencyCode>);

impl SupportedCurrencies {
    pub fn new(codes: impl IntoIterator<Item = CurrencyCode>) -> Self {
        let mut unique: Vec<CurrencyCode> = Vec::new();
        for code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        Self(unique)
    }

    /// Parses a comma-separated list such as `"USD, GBP,jpy"`.
    pub fn parse_list(list: &str) -> Result<Self, DomainError> {
        let codes = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(CurrencyCode::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if codes.is_empty() {
            return Err(DomainError::ValidationError(
                "At least one supported currency is required".into(),
            ));
        }
        Ok(Self::new(codes))
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.0.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[CurrencyCode] {
        &self.0
    }
}
