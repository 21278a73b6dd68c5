//! Host configuration.
//!
//! Values are layered: built-in defaults, then the TOML file named by
//! `--config`, then individual command-line flags.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tax_core::BatchOptions;
use tax_core::db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Worker count must be at least 1")]
    ZeroWorkers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DbConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Compute workers. Unset means one per available CPU.
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Any `EnvFilter` directive. `RUST_LOG` wins when it is set.
    pub level: String,
    /// Also append log lines to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults when no file is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn batch_options(&self) -> Result<BatchOptions, ConfigError> {
        match self.batch.workers {
            None => Ok(BatchOptions::default()),
            Some(n) => NonZeroUsize::new(n)
                .map(BatchOptions::with_workers)
                .ok_or(ConfigError::ZeroWorkers),
        }
    }
}

/// Command-line values that replace whatever the file or defaults set.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub workers: Option<usize>,
    /// Only ever switches migrations on.
    pub migrate: bool,
    pub seeds_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        if let Some(connection_string) = self.connection_string {
            config.database.connection_string = connection_string;
        }
        if self.migrate {
            config.database.run_migrations = true;
        }
        if let Some(seeds_dir) = self.seeds_dir {
            config.database.seeds_dir = Some(seeds_dir);
        }
        if let Some(workers) = self.workers {
            config.batch.workers = Some(workers);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(file) = self.log_file {
            config.logging.file = Some(file);
        }
    }
}
