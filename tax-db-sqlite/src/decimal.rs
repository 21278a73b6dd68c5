//! Decimal columns.
//!
//! Money is stored as TEXT so values round-trip exactly. Rows written by
//! other tools may still hold INTEGER or REAL storage, which is accepted.

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::RepositoryError;

fn column_error(column: &str, problem: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Database(format!("Column '{column}' {problem}"))
}

/// Read a required decimal column.
///
/// A NULL is a schema mismatch. Errors name the column but never echo the
/// stored value.
pub fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw = row
        .try_get_raw(column)
        .map_err(|e| column_error(column, format_args!("not found: {e}")))?;
    let type_info = raw.type_info();

    let parsed = match type_info.name() {
        "TEXT" => {
            let text: String = row
                .try_get(column)
                .map_err(|e| column_error(column, format_args!("unreadable as TEXT: {e}")))?;
            text.trim().parse::<Decimal>().ok()
        }
        "INTEGER" => {
            let int: i64 = row
                .try_get(column)
                .map_err(|e| column_error(column, format_args!("unreadable as INTEGER: {e}")))?;
            Some(Decimal::from(int))
        }
        "REAL" => {
            let real: f64 = row
                .try_get(column)
                .map_err(|e| column_error(column, format_args!("unreadable as REAL: {e}")))?;
            Decimal::try_from(real).ok()
        }
        "NULL" => return Err(column_error(column, "is NULL")),
        other => {
            return Err(RepositoryError::Database(format!(
                "Unexpected type '{other}' for column '{column}'"
            )));
        }
    };

    parsed.ok_or_else(|| column_error(column, "does not hold a decimal"))
}

/// Like [`get_decimal`], with NULL read as `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw = row
        .try_get_raw(column)
        .map_err(|e| column_error(column, format_args!("not found: {e}")))?;

    if raw.is_null() {
        return Ok(None);
    }
    get_decimal(row, column).map(Some)
}

/// TEXT storage form: normalised, so `100.00` is stored as `100`.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}
