//! Rates CLI
//!
//! Command-line interface for the exchange rate API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use rates_client::RatesClient;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "EUR reference rate API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the rates API
    #[arg(long, env = "RATES_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate lookups
    Rates {
        #[command(subcommand)]
        action: RateCommands,
    },
    /// List supported currencies
    Currencies,
    /// Convert a foreign amount into EUR
    Convert {
        /// Source currency code (e.g. USD)
        #[arg(long)]
        currency: String,
        /// Amount with at most 2 decimals
        #[arg(long)]
        amount: Decimal,
        /// Reference date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum RateCommands {
    /// List all stored rates
    List,
    /// Show rates for a date, or a single currency's rate
    Get {
        /// Reference date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Currency code; all currencies when omitted
        currency: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date: {} (expected YYYY-MM-DD)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = RatesClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currencies => {
            let currencies = client.currencies().await?;
            println!("{}", serde_json::to_string_pretty(&currencies)?);
        }

        Commands::Rates { action } => match action {
            RateCommands::List => {
                let rows = client.list_rates().await?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            RateCommands::Get {
                date,
                currency: Some(currency),
            } => {
                let rate = client.rate(date, &currency).await?;
                println!("{rate}");
            }
            RateCommands::Get {
                date,
                currency: None,
            } => {
                let rates = client.rates_for(date).await?;
                println!("{}", serde_json::to_string_pretty(&rates)?);
            }
        },

        Commands::Convert {
            currency,
            amount,
            date,
        } => {
            let result = client.convert(&currency, amount, date).await?;
            println!("{}", result.formatted_result);
        }
    }

    Ok(())
}
