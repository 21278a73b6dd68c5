use anyhow::{Context, Result};
use tracing::debug;

use tax_core::db::RepositoryRegistry;
use tax_core::{BatchSummary, TaxBatch};
use tax_db_sqlite::SqliteRepositoryFactory;

use crate::config::AppConfig;

/// Register every compiled-in database backend.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the configured store and runs one batch over it.
///
/// A [`tax_core::BatchError`] is returned unchanged inside the `anyhow`
/// error, so callers can downcast it to find the failing stage.
pub async fn run(config: &AppConfig) -> Result<BatchSummary> {
    let options = config.batch_options()?;

    debug!(backend = %config.database.backend, "opening repository");
    let repo = build_registry()
        .create(&config.database)
        .await
        .with_context(|| format!("Failed to open {} backend", config.database.backend))?;

    let summary = TaxBatch::new(&*repo, options).run_batch().await?;
    Ok(summary)
}
