//! HTTP client for the Bundesbank time series API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, instrument};

use rates_types::{CurrencyCode, CurrencyRates, FetchRange, RateSource, SourceError};

use crate::decode::decode;
use crate::sdmx::SdmxResponse;

/// Public endpoint of the Bundesbank statistics REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.statistiken.bundesbank.de/rest";

const ERROR_BODY_LIMIT: usize = 200;

/// Fixed parts of the daily euro reference rate series key
/// `{frequency}.{currency}.EUR.{series_type}.{rate_type}.{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKey {
    pub dataflow: String,
    pub frequency: String,
    pub series_type: String,
    pub rate_type: String,
    pub suffix: String,
}

impl Default for SeriesKey {
    fn default() -> Self {
        Self {
            dataflow: "BBEX3".into(),
            frequency: "D".into(),
            series_type: "BB".into(),
            rate_type: "AC".into(),
            suffix: "000".into(),
        }
    }
}

/// Reference rate source backed by the Bundesbank SDMX endpoint.
pub struct BundesbankClient {
    base_url: String,
    series: SeriesKey,
    http: Client,
}

impl BundesbankClient {
    /// Creates a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            series: SeriesKey::default(),
            http: Client::new(),
        }
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Builds the data URL for one currency's series.
    pub fn series_url(&self, currency: &CurrencyCode, range: FetchRange) -> String {
        let SeriesKey {
            dataflow,
            frequency,
            series_type,
            rate_type,
            suffix,
        } = &self.series;
        let path = format!(
            "{}/data/{dataflow}/{frequency}.{currency}.EUR.{series_type}.{rate_type}.{suffix}",
            self.base_url
        );
        match range {
            FetchRange::Between { start, end } => format!(
                "{path}?startPeriod={}&endPeriod={}&format=json",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            FetchRange::FullHistory => format!("{path}?format=json"),
        }
    }
}

#[async_trait]
impl RateSource for BundesbankClient {
    #[instrument(skip(self), fields(currency = %currency))]
    async fn fetch_rates(
        &self,
        currency: &CurrencyCode,
        range: FetchRange,
    ) -> Result<CurrencyRates, SourceError> {
        let url = self.series_url(currency, range);
        debug!(%url, "Fetching reference rates");

        let resp = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = resp.status();
        // The API answers 404 when nothing was published in the range.
        if status == StatusCode::NOT_FOUND {
            debug!("No observations published for requested range");
            return Ok(CurrencyRates::new());
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let payload: SdmxResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        let outcome = decode(&payload);

        if outcome.skipped_total() > 0 {
            debug!(
                skipped = outcome.skipped_total(),
                reasons = ?outcome.skipped,
                "Dropped malformed observations"
            );
        }
        debug!(observations = outcome.rates.len(), "Decoded reference rates");

        Ok(outcome.rates)
    }
}
