use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tax_core::db::DbConfig;
use tax_core::{
    BracketLine, ComputedResult, NewPendingRecord, PendingRecord, RateCode, RepositoryError,
    TaxRate, TaxRegime, TaxRepository,
};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

/// Rows per multi-row statement. Each row binds three parameters, which
/// keeps a statement well under SQLite's 32766 bound-parameter limit.
const ROWS_PER_STATEMENT: usize = 5_000;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens a pool sized and timed from `config`.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// pinned to a single connection that never idles out.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let in_memory = is_in_memory(&config.connection_string);
        let options = connect_options(&config.connection_string)?;

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database '{}'", config.connection_string))?;

        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(connection_string: &str) -> bool {
    matches!(connection_string, ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
}

/// Accepts a sqlx URL (`sqlite:taxes.db?mode=rwc`), a bare file path, or
/// `:memory:`. Files are created when missing and foreign keys are enforced.
fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions> {
    let options = if is_in_memory(connection_string) {
        SqliteConnectOptions::from_str("sqlite::memory:")?
    } else if connection_string.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(connection_string)
            .with_context(|| format!("Invalid SQLite URL '{}'", connection_string))?
    } else {
        SqliteConnectOptions::new().filename(connection_string)
    };

    Ok(options.create_if_missing(true).foreign_keys(true))
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_tax_rate(row: &SqliteRow) -> Result<TaxRate, RepositoryError> {
    let rate_code: Option<String> = row
        .try_get("rate_code")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(TaxRate {
        jurisdiction_id: row
            .try_get("jurisdiction_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        rate: get_decimal(row, "rate")?,
        rate_code: RateCode::parse(rate_code.as_deref()),
    })
}

fn row_to_bracket_line(row: &SqliteRow) -> Result<BracketLine, RepositoryError> {
    Ok(BracketLine {
        jurisdiction_id: row
            .try_get("jurisdiction_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        order_number: row
            .try_get("order_number")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        lower_limit: get_decimal(row, "lower_limit")?,
        upper_limit: get_decimal(row, "upper_limit")?,
        rate: get_decimal(row, "rate")?,
    })
}

fn row_to_pending_record(row: &SqliteRow) -> Result<PendingRecord, RepositoryError> {
    let regime_code: Option<String> = row
        .try_get("tax_regime")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(PendingRecord {
        record_id: row
            .try_get("record_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        jurisdiction_id: row
            .try_get("jurisdiction_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        regime: TaxRegime::from_optional(regime_code.as_deref()),
        gross_income: get_decimal(row, "income")?,
    })
}

#[async_trait]
impl TaxRepository for SqliteRepository {
    async fn list_tax_rates(&self) -> Result<Vec<TaxRate>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT jurisdiction_id, rate, rate_code
             FROM tax_rate
             ORDER BY jurisdiction_id, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_tax_rate).collect()
    }

    async fn list_bracket_lines(&self) -> Result<Vec<BracketLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT b.jurisdiction_id, l.order_number, l.lower_limit, l.upper_limit, l.rate
             FROM tax_bracket_line l
             INNER JOIN tax_bracket b ON l.tax_bracket_id = b.id
             ORDER BY b.jurisdiction_id, l.order_number, l.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_bracket_line).collect()
    }

    async fn list_pending_records(&self) -> Result<Vec<PendingRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT tc.id AS record_id, tc.jurisdiction_id, j.tax_regime, tc.income
             FROM tax_calculation tc
             LEFT JOIN jurisdiction j ON j.id = tc.jurisdiction_id
             ORDER BY tc.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_pending_record).collect()
    }

    async fn upsert_pending_records(
        &self,
        records: &[NewPendingRecord],
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut touched = 0;

        for chunk in records.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO tax_calculation (id, jurisdiction_id, income) ");
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.record_id)
                    .push_bind(record.jurisdiction_id)
                    .push_bind(decimal_to_text(record.gross_income));
            });
            builder.push(
                " ON CONFLICT (id) DO UPDATE SET
                    jurisdiction_id = excluded.jurisdiction_id,
                    income = excluded.income,
                    calculated_tax = NULL,
                    net_pay = NULL",
            );

            touched += builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(db_error)?
                .rows_affected();
        }

        tx.commit().await.map_err(db_error)?;
        Ok(touched)
    }

    /// All statements run in one transaction, so the store either takes the
    /// whole result set or none of it.
    async fn write_results(
        &self,
        results: &[ComputedResult],
    ) -> Result<u64, RepositoryError> {
        if results.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut updated = 0;

        for chunk in results.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "UPDATE tax_calculation
                 SET calculated_tax = v.column2, net_pay = v.column3
                 FROM (",
            );
            builder.push_values(chunk, |mut row, result| {
                row.push_bind(result.record_id)
                    .push_bind(decimal_to_text(result.tax))
                    .push_bind(decimal_to_text(result.net_pay));
            });
            builder.push(") AS v WHERE tax_calculation.id = v.column1");

            updated += builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(db_error)?
                .rows_affected();
        }

        tx.commit().await.map_err(db_error)?;
        debug!(rows = updated, statements = results.len().div_ceil(ROWS_PER_STATEMENT), "bulk update committed");
        Ok(updated)
    }
}
