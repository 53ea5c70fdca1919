//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Start the rate synchronizer in the background
//! - Start the HTTP server

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("Enable a repo feature: `postgres` or `sqlite`.");

mod config;
mod scheduler;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bundesbank_sdmx::BundesbankClient;
use rates_hex::{ExchangeRateService, RateSynchronizer, inbound::HttpServer};
use rates_repo::build_repo;
use rates_types::{Clock, SystemClock};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("rates-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // OpenTelemetry export only when a collector is configured
    let otel = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(_) => Some(init_tracer()?),
        Err(_) => None,
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting rates server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!(
        source = %config.bundesbank_api_url,
        currencies = config.supported_currencies.len(),
        "Rate source configured"
    );

    // Build repository (handles connection and migration)
    let repo = Arc::new(build_repo(&config.database_url).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Outbound client for the Bundesbank API
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let source = Arc::new(BundesbankClient::new(&config.bundesbank_api_url).with_http_client(http));

    // Backfill + daily top-up run in the background; the API serves what is stored
    let synchronizer = RateSynchronizer::new(
        repo.clone(),
        source,
        config.supported_currencies.clone(),
        clock.clone(),
    );
    let sync_task = scheduler::start_rate_sync_scheduler(synchronizer, config.update_time);

    // Create and run the HTTP server
    let service = ExchangeRateService::new(repo, config.supported_currencies, clock);
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    sync_task.abort();

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
