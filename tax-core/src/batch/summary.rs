use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Why a pending record produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    /// The record's jurisdiction has no entry in the rule table.
    MissingJurisdiction,
    /// The jurisdiction's regime code matches no strategy.
    UnknownRegime(String),
    /// Tax or net pay does not fit in a `Decimal`.
    Overflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingJurisdiction => write!(f, "missing jurisdiction"),
            Self::UnknownRegime(code) => write!(f, "unknown regime '{code}'"),
            Self::Overflow => write!(f, "arithmetic overflow"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SkippedRecord {
    pub record_id: i64,
    pub jurisdiction_id: i32,
    pub reason: SkipReason,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Pending records consumed.
    pub processed: usize,
    /// Results produced and handed to the sink.
    pub computed: usize,
    pub unknown_regime: usize,
    pub missing_jurisdiction: usize,
    pub overflowed: usize,
    /// Rows the store reported as updated.
    pub written: u64,
    pub workers: usize,
    pub skipped: Vec<SkippedRecord>,
    pub elapsed: Duration,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} calculations completed in {}ms ({} computed, {} unknown regime, {} missing jurisdiction, {} overflowed)",
            self.processed,
            self.elapsed.as_millis(),
            self.computed,
            self.unknown_regime,
            self.missing_jurisdiction,
            self.overflowed
        )
    }
}
