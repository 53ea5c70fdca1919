//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveTime;

use bundesbank_sdmx::DEFAULT_BASE_URL;
use rates_types::SupportedCurrencies;

const DEFAULT_CURRENCIES: &str = "USD,GBP,JPY,CHF,CAD,AUD,SEK,NOK,DKK,PLN";

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub bundesbank_api_url: String,
    pub supported_currencies: SupportedCurrencies,
    /// UTC time of day of the daily rate update.
    pub update_time: NaiveTime,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a port number")?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let bundesbank_api_url =
            lookup("BUNDESBANK_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let supported_currencies = SupportedCurrencies::parse_list(
            &lookup("SUPPORTED_CURRENCIES").unwrap_or_else(|| DEFAULT_CURRENCIES.to_string()),
        )
        .context("SUPPORTED_CURRENCIES must be a comma separated list of currency codes")?;

        let update_time = NaiveTime::parse_from_str(
            &lookup("RATES_UPDATE_TIME").unwrap_or_else(|| "12:00".to_string()),
            "%H:%M",
        )
        .context("RATES_UPDATE_TIME must be HH:MM")?;

        let http_timeout = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            port,
            database_url,
            bundesbank_api_url,
            supported_currencies,
            update_time,
            http_timeout,
        })
    }
}
