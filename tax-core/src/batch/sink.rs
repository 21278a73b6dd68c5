use std::time::Instant;

use tracing::{info, warn};

use crate::db::{RepositoryError, TaxRepository};
use crate::models::ComputedResult;

/// Hands the full result set to the store in one bulk call.
///
/// Which rows survive a failure is up to the store; this function makes no
/// claim beyond reporting the error.
pub async fn write_back(
    repository: &dyn TaxRepository,
    results: &[ComputedResult],
) -> Result<u64, RepositoryError> {
    let started = Instant::now();

    let written = repository.write_results(results).await?;

    if written != results.len() as u64 {
        warn!(
            expected = results.len(),
            written, "store updated a different number of rows than results supplied"
        );
    }
    info!(
        written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote back computed results"
    );

    Ok(written)
}
