//! The batch recompute: load rules and records, compute in parallel, write
//! everything back in one go.

mod compute;
mod engine;
mod error;
mod options;
mod rules;
mod sink;
mod summary;

pub use compute::{Computation, RecordOutcome, compute_batch, compute_record, partition};
pub use engine::TaxBatch;
pub use error::BatchError;
pub use options::BatchOptions;
pub use rules::load_rules;
pub use sink::write_back;
pub use summary::{BatchSummary, SkipReason, SkippedRecord};
