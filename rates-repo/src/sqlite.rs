//! SQLite repository adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use rates_types::{ExchangeRateRepository, ExchangeRates, RepoError};

use crate::types::{SqliteRateEntry, group_entries};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ExchangeRateRepository for SqliteRepo {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ExchangeRates>, RepoError> {
        let rows: Vec<SqliteRateEntry> = sqlx::query_as(
            r#"SELECT e.date, c.currency_code, c.rate
               FROM exchange_rates e
               LEFT JOIN currency_rates c ON c.exchange_rate_id = e.id
               WHERE e.date = ?"#,
        )
        .bind(date_key(date))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(SqliteRateEntry::into_parts)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(group_entries(entries)?.into_iter().next())
    }

    async fn find_all_ordered_by_date(&self) -> Result<Vec<ExchangeRates>, RepoError> {
        let rows: Vec<SqliteRateEntry> = sqlx::query_as(
            r#"SELECT e.date, c.currency_code, c.rate
               FROM exchange_rates e
               LEFT JOIN currency_rates c ON c.exchange_rate_id = e.id
               ORDER BY e.date ASC, c.currency_code ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(SqliteRateEntry::into_parts)
            .collect::<Result<Vec<_>, _>>()?;
        group_entries(entries)
    }

    async fn exists_by_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
        let (count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM exchange_rates WHERE date = ?"#)
                .bind(date_key(date))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM exchange_rates"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(count)
    }

    async fn save(&self, rates: ExchangeRates) -> Result<bool, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let inserted = sqlx::query(
            r#"INSERT INTO exchange_rates (date, created_at) VALUES (?, ?)
               ON CONFLICT(date) DO NOTHING"#,
        )
        .bind(date_key(rates.date))
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if inserted.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }
        let row_id = inserted.last_insert_rowid();

        for (currency, rate) in &rates.rates {
            sqlx::query(
                r#"INSERT INTO currency_rates (exchange_rate_id, currency_code, rate) VALUES (?, ?, ?)"#,
            )
            .bind(row_id)
            .bind(currency.as_str())
            .bind(rate.to_string())
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(true)
    }
}
