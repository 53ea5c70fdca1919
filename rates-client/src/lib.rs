//! # Rates Client SDK
//!
//! A typed Rust client for the exchange rate API.

use chrono::NaiveDate;
use rates_types::{ConversionResult, CurrencyCode, ExchangeRateDto, ExchangeRateResponse};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Machine-readable error code returned by the API, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Exchange rate API client.
pub struct RatesClient {
    base_url: String,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Lists the supported currencies.
    pub async fn currencies(&self) -> Result<Vec<CurrencyCode>, ClientError> {
        self.get("/api/currencies", &[]).await
    }

    /// Lists every stored rate row, oldest first.
    pub async fn list_rates(&self) -> Result<Vec<ExchangeRateDto>, ClientError> {
        self.get("/api/rates", &[]).await
    }

    /// Gets all rates for a date.
    pub async fn rates_for(&self, date: NaiveDate) -> Result<ExchangeRateResponse, ClientError> {
        self.get(&format!("/api/rates/{}", date), &[]).await
    }

    /// Gets one currency's rate (units per 1 EUR) for a date.
    pub async fn rate(&self, date: NaiveDate, currency: &str) -> Result<Decimal, ClientError> {
        self.get(&format!("/api/rates/{}/{}", date, currency), &[])
            .await
    }

    /// Converts `amount` of `currency` into EUR at the rate of `date`.
    pub async fn convert(
        &self,
        currency: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<ConversionResult, ClientError> {
        let amount = amount.to_string();
        let date = date.to_string();
        self.get(
            "/api/convert",
            &[
                ("currency", currency),
                ("amount", amount.as_str()),
                ("date", date.as_str()),
            ],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
            let field = |name: &str| {
                parsed
                    .as_ref()
                    .and_then(|v| v.get(name).and_then(|e| e.as_str()).map(String::from))
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                code: field("code"),
                message: field("error").unwrap_or(body),
            })
        }
    }
}
