use std::collections::HashSet;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{NewPendingRecord, RepositoryError, TaxRepository};
use thiserror::Error;

/// Errors that can occur when importing pending records.
#[derive(Debug, Error)]
pub enum PendingRecordLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Record {0} appears more than once in the input")]
    DuplicateRecord(i64),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PendingRecordLoaderError {
    fn from(err: csv::Error) -> Self {
        PendingRecordLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the pending records CSV file.
///
/// - `record_id`: identity of the calculation record in the store
/// - `jurisdiction_id`: the jurisdiction whose rules apply
/// - `income`: gross income, as an exact decimal (e.g. `1000.01`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PendingRecordRow {
    pub record_id: i64,
    pub jurisdiction_id: i32,
    pub income: Decimal,
}

impl From<&PendingRecordRow> for NewPendingRecord {
    fn from(row: &PendingRecordRow) -> Self {
        NewPendingRecord {
            record_id: row.record_id,
            jurisdiction_id: row.jurisdiction_id,
            gross_income: row.income,
        }
    }
}

/// Imports pending tax calculation records from CSV.
///
/// Records go through `TaxRepository::upsert_pending_records`, so the loader
/// works with any backend. Importing a record that already exists replaces
/// its jurisdiction and income and clears any previously written result.
pub struct PendingRecordLoader;

impl PendingRecordLoader {
    /// Parse pending records from a CSV reader.
    ///
    /// Fields are trimmed. A record id may appear only once per input.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PendingRecordRow>, PendingRecordLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for result in csv_reader.deserialize() {
            let row: PendingRecordRow = result?;
            if !seen.insert(row.record_id) {
                return Err(PendingRecordLoaderError::DuplicateRecord(row.record_id));
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Write parsed rows to the store. Returns the number of records touched.
    pub async fn load<R: TaxRepository + ?Sized>(
        repo: &R,
        rows: &[PendingRecordRow],
    ) -> Result<u64, PendingRecordLoaderError> {
        let records: Vec<NewPendingRecord> = rows.iter().map(NewPendingRecord::from).collect();
        Ok(repo.upsert_pending_records(&records).await?)
    }
}
