use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use tax_batch::config::{AppConfig, ConfigOverrides};
use tax_batch::{app, logging};
use tax_core::BatchError;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Recompute tax and net pay for every pending calculation record.
///
/// Loads the jurisdiction rule table and the pending records, computes each
/// record in parallel, and writes all results back in one transaction.
#[derive(Debug, Parser)]
#[command(name = "tax-batch", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `taxes.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Number of compute workers (defaults to available CPUs).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run database migrations before the batch.
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations.
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `info,tax_core=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_overrides(self) -> (Option<PathBuf>, ConfigOverrides) {
        let overrides = ConfigOverrides {
            backend: self.backend,
            connection_string: self.db,
            workers: self.workers,
            migrate: self.migrate,
            seeds_dir: self.seeds,
            log_level: self.log_level,
            log_file: self.log_file,
        };
        (self.config, overrides)
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let (config_path, overrides) = Cli::parse().into_overrides();

    let mut config = AppConfig::load_or_default(config_path.as_deref())?;
    overrides.apply(&mut config);

    logging::init_logging(&config.logging)?;
    debug!(?config, "configuration resolved");

    match app::run(&config).await {
        Ok(summary) => {
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            match e.downcast_ref::<BatchError>() {
                Some(batch) => eprintln!("tax batch failed at {}: {batch}", batch.stage()),
                None => eprintln!("tax batch failed: {e:#}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
