use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::db::{DbConfig, RepositoryFactory};
use tax_data::PendingRecordLoader;
use tax_db_sqlite::SqliteRepositoryFactory;

/// Import pending tax calculation records from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - record_id: Identity of the calculation record
/// - jurisdiction_id: Jurisdiction whose rules apply to the record
/// - income: Gross income as a decimal (e.g., 1000.01)
///
/// Existing records with the same id are replaced and their results cleared.
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing pending records
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database file or URL; created when missing
    #[arg(short, long, default_value = "taxes.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = DbConfig {
        connection_string: args.database,
        run_migrations: args.migrate,
        seeds_dir: args.seeds,
        ..DbConfig::default()
    };
    let repo = SqliteRepositoryFactory
        .create(&config)
        .await
        .with_context(|| format!("Failed to prepare database: {}", config.connection_string))?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let rows = PendingRecordLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    println!("Parsed {} records from {}", rows.len(), args.file.display());

    let loaded = PendingRecordLoader::load(&*repo, &rows)
        .await
        .context("Failed to load pending records into database")?;
    println!("Loaded {loaded} pending records into {}.", config.connection_string);

    Ok(())
}
