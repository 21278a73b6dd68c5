pub mod batch;
pub mod calculations;
pub mod db;
pub mod models;

pub use batch::{BatchError, BatchOptions, BatchSummary, SkipReason, TaxBatch};
pub use db::repository::{RepositoryError, TaxRepository};
pub use models::*;
