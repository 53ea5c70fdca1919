//! HTTP request handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use rates_types::{AppError, ConversionRequest, ExchangeRateRepository};

use crate::ExchangeRateService;

/// Application state shared across handlers.
pub struct AppState<R: ExchangeRateRepository> {
    pub service: ExchangeRateService<R>,
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[schema(example = "RATE_NOT_FOUND")]
    pub code: String,
    #[schema(example = 404)]
    pub status: u16,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) | AppError::UnsupportedCurrency(_) => StatusCode::BAD_REQUEST,
            AppError::DateNotFound(_) | AppError::RateNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::ZeroRate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: self.0.code().to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Query string of `GET /api/convert`; parsed by hand so that bad input
/// yields the JSON error body instead of an extractor rejection.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertParams {
    /// Three-letter source currency code
    pub currency: Option<String>,
    /// Amount in the source currency, e.g. `110.00`
    pub amount: Option<String>,
    /// Reference date, `YYYY-MM-DD`
    pub date: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date {raw:?}, expected YYYY-MM-DD")))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing query parameter `{name}`")))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// List supported currencies.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.available_currencies().to_vec())
}

/// List every stored rate row.
#[tracing::instrument(skip(state))]
pub async fn list_rates<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.service.all_exchange_rates().await?;
    Ok(Json(rows))
}

/// Get all rates for a date.
#[tracing::instrument(skip(state))]
pub async fn get_rates<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_date(&date)?;
    let rates = state.service.exchange_rates(date).await?;
    Ok(Json(rates))
}

/// Get one currency's rate for a date.
#[tracing::instrument(skip(state))]
pub async fn get_rate<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path((date, currency)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_date(&date)?;
    let rate = state.service.exchange_rate(date, &currency).await?;
    Ok(Json(rate))
}

/// Convert a foreign amount into EUR.
#[tracing::instrument(skip(state))]
pub async fn convert<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<ConvertParams>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = required(&params.currency, "currency")?.to_string();
    let amount = required(&params.amount, "amount")?;
    let amount = Decimal::from_str(amount)
        .map_err(|_| AppError::BadRequest(format!("Invalid amount {amount:?}")))?;
    let date = parse_date(required(&params.date, "date")?)?;

    let result = state
        .service
        .convert_to_eur(ConversionRequest {
            currency,
            amount,
            date,
        })
        .await?;
    Ok(Json(result))
}
