use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::repository::{RepositoryError, TaxRepository};

/// Where the batch reads rules and records, and how the store is prepared.
///
/// `backend` selects a factory registered with [`RepositoryRegistry`]; the
/// remaining fields are interpreted by that factory.
///
/// | backend    | connection_string examples                    |
/// |------------|-----------------------------------------------|
/// | `sqlite`   | `taxes.db`, `sqlite:taxes.db`, `:memory:`     |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
    /// Pool ceiling. A run reads rates, brackets and records concurrently, so
    /// it holds up to three connections at once.
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply schema migrations before handing out the repository.
    pub run_migrations: bool,
    /// Directory of `*.sql` seed files, run after migrations.
    pub seeds_dir: Option<PathBuf>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
            max_connections: 4,
            acquire_timeout_secs: 30,
            run_migrations: true,
            seeds_dir: None,
        }
    }
}

/// Builds repositories for one storage backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Open the store and return a repository ready for a batch run.
    async fn create(&self, config: &DbConfig) -> Result<Box<dyn TaxRepository>, RepositoryError>;
}

/// Backend factories by name. Hosts register what they link in and then
/// resolve a [`DbConfig`] through [`RepositoryRegistry::create`].
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`. A later registration under the same name wins.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] when nothing is registered under
    /// that name; otherwise whatever the factory reports.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        debug!(backend = factory.backend_name(), "creating repository");
        factory.create(config).await
    }
}
