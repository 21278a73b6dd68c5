use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxRegime;

/// A record awaiting tax recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub record_id: i64,
    pub jurisdiction_id: i32,
    pub regime: TaxRegime,
    pub gross_income: Decimal,
}

/// For importing records into the store (no regime; that belongs to the
/// jurisdiction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPendingRecord {
    pub record_id: i64,
    pub jurisdiction_id: i32,
    pub gross_income: Decimal,
}
