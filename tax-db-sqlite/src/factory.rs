use async_trait::async_trait;
use tracing::info;

use tax_core::db::repository::{RepositoryError, TaxRepository};
use tax_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// The `"sqlite"` backend. Connects, migrates when asked, then seeds.
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, apply
    /// migrations when `config.run_migrations` is set, then run the seed
    /// files from `config.seeds_dir` if one is given.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let repo = SqliteRepository::connect(config)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;

        if config.run_migrations {
            repo.run_migrations()
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        }

        if let Some(seeds_dir) = &config.seeds_dir {
            repo.run_seeds(seeds_dir)
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        }

        info!(
            backend = self.backend_name(),
            migrated = config.run_migrations,
            seeded = config.seeds_dir.is_some(),
            "sqlite repository ready"
        );
        Ok(Box::new(repo))
    }
}
