//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use rates_types::{ExchangeRateRepository, ExchangeRates, RepoError};

use crate::types::{PgRateEntry, group_entries};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository. Uniqueness of `date` is enforced by the schema.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ExchangeRateRepository for PostgresRepo {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ExchangeRates>, RepoError> {
        let rows: Vec<PgRateEntry> = sqlx::query_as(
            r#"SELECT e.date, TRIM(c.currency_code) AS currency_code, c.rate::TEXT AS rate
               FROM exchange_rates e
               LEFT JOIN currency_rates c ON c.exchange_rate_id = e.id
               WHERE e.date = $1"#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(PgRateEntry::into_parts)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(group_entries(entries)?.into_iter().next())
    }

    async fn find_all_ordered_by_date(&self) -> Result<Vec<ExchangeRates>, RepoError> {
        let rows: Vec<PgRateEntry> = sqlx::query_as(
            r#"SELECT e.date, TRIM(c.currency_code) AS currency_code, c.rate::TEXT AS rate
               FROM exchange_rates e
               LEFT JOIN currency_rates c ON c.exchange_rate_id = e.id
               ORDER BY e.date ASC, c.currency_code ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(PgRateEntry::into_parts)
            .collect::<Result<Vec<_>, _>>()?;
        group_entries(entries)
    }

    async fn exists_by_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM exchange_rates WHERE date = $1)"#)
                .bind(date)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(exists)
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

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"INSERT INTO exchange_rates (date) VALUES ($1)
               ON CONFLICT (date) DO NOTHING
               RETURNING id"#,
        )
        .bind(rates.date)
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some((row_id,)) = inserted else {
            return Ok(false);
        };

        for (currency, rate) in &rates.rates {
            sqlx::query(
                r#"INSERT INTO currency_rates (exchange_rate_id, currency_code, rate)
                   VALUES ($1, $2, $3::NUMERIC)"#,
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
