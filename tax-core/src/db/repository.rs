use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BracketLine, ComputedResult, NewPendingRecord, PendingRecord, TaxRate};

/// Any failure reading or writing the backing store.
///
/// Messages describe what failed (column, statement, connection) and never
/// carry rule values or record contents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait TaxRepository: Send + Sync {
    // Rule table sources
    async fn list_tax_rates(&self) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Every bracket line, ordered by jurisdiction and then `order_number`.
    async fn list_bracket_lines(&self) -> Result<Vec<BracketLine>, RepositoryError>;

    // Pending records
    async fn list_pending_records(&self) -> Result<Vec<PendingRecord>, RepositoryError>;

    /// Inserts or replaces records in one bulk statement. A replaced record
    /// loses any previously computed result. Returns the number of rows
    /// touched.
    async fn upsert_pending_records(
        &self,
        records: &[NewPendingRecord],
    ) -> Result<u64, RepositoryError>;

    /// Applies every result as one bulk operation. Returns the number of
    /// rows updated.
    async fn write_results(
        &self,
        results: &[ComputedResult],
    ) -> Result<u64, RepositoryError>;
}
