use std::time::Instant;

use tracing::info;

use crate::db::{RepositoryError, TaxRepository};
use crate::models::RuleTable;

/// Reads every rate row and every bracket line in two concurrent bulk queries
/// and folds them into a [`RuleTable`].
///
/// Either the complete table is returned or the first read error is; a
/// half-built table never escapes.
pub async fn load_rules(repository: &dyn TaxRepository) -> Result<RuleTable, RepositoryError> {
    let started = Instant::now();

    let (rates, brackets) =
        tokio::try_join!(repository.list_tax_rates(), repository.list_bracket_lines())?;

    let rate_rows = rates.len();
    let table = RuleTable::from_rows(rates, brackets);

    info!(
        jurisdictions = table.len(),
        rate_rows,
        bracket_lines = table.bracket_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded tax rule table"
    );

    Ok(table)
}
