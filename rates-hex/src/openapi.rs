//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::CurrencyCode;
use rates_types::dto::{
    ConversionResult, ExchangeRateDto, ExchangeRateResponse,
};
use utoipa::OpenApi;

use crate::inbound::handlers::{ConvertParams, ErrorResponse};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "rates",
    responses(
        (status = 200, description = "Configured currency codes", body = Vec<CurrencyCode>, example = json!(["USD", "GBP", "JPY"]))
    )
)]
async fn list_currencies() {}

/// List all stored rates, oldest first
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    responses(
        (status = 200, description = "All stored rate rows", body = Vec<ExchangeRateDto>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn list_rates() {}

/// Get all rates for a date
#[utoipa::path(
    get,
    path = "/api/rates/{date}",
    tag = "rates",
    params(
        ("date" = String, Path, description = "Reference date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Rates published on the date", body = ExchangeRateResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 404, description = "No rates stored for the date", body = ErrorResponse)
    )
)]
async fn get_rates() {}

/// Get one currency's rate for a date
#[utoipa::path(
    get,
    path = "/api/rates/{date}/{currency}",
    tag = "rates",
    params(
        ("date" = String, Path, description = "Reference date (YYYY-MM-DD)"),
        ("currency" = String, Path, description = "Currency code (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Rate of the currency on the date", body = String, example = json!("1.0956")),
        (status = 400, description = "Malformed input or unsupported currency", body = ErrorResponse),
        (status = 404, description = "No rates for the date, or none for the currency", body = ErrorResponse)
    )
)]
async fn get_rate() {}

/// Convert a foreign amount into EUR
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "conversion",
    params(ConvertParams),
    responses(
        (status = 200, description = "Conversion result", body = ConversionResult),
        (status = 400, description = "Invalid request or unsupported currency", body = ErrorResponse),
        (status = 404, description = "No rate for the date or currency", body = ErrorResponse),
        (status = 422, description = "Published rate is zero", body = ErrorResponse)
    )
)]
async fn convert() {}

/// OpenAPI documentation for the exchange rate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EUR Reference Rate Service API",
        version = "1.0.0",
        description = "Daily EUR foreign exchange reference rates mirrored from the Deutsche Bundesbank statistics API, with foreign -> EUR conversion.\n\nRates are quoted as units of foreign currency per 1 EUR.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        list_rates,
        get_rates,
        get_rate,
        convert,
    ),
    components(
        schemas(
            CurrencyCode,
            ExchangeRateDto,
            ExchangeRateResponse,
            ConversionResult,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Stored reference rates"),
        (name = "conversion", description = "Foreign currency -> EUR conversion"),
    )
)]
pub struct ApiDoc;
