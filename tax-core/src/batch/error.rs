use thiserror::Error;

use crate::db::RepositoryError;

/// Failures that abort a whole run.
///
/// Per-record problems (unknown regime, missing jurisdiction, overflow) are not errors;
/// they are counted in the [`BatchSummary`](super::BatchSummary).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("failed to load jurisdiction tax rules: {0}")]
    LoadRules(#[source] RepositoryError),

    #[error("failed to load pending records: {0}")]
    LoadRecords(#[source] RepositoryError),

    #[error("failed to write back {count} results: {source}")]
    WriteBack {
        count: usize,
        #[source]
        source: RepositoryError,
    },

    #[error("tax worker failed: {0}")]
    Worker(String),
}

impl BatchError {
    /// Short name of the stage that failed, for log fields and exit messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::LoadRules(_) => "load-rules",
            Self::LoadRecords(_) => "load-records",
            Self::WriteBack { .. } => "write-back",
            Self::Worker(_) => "compute",
        }
    }
}
