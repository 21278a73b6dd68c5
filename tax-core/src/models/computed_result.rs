use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputedResult {
    pub record_id: i64,
    pub tax: Decimal,
    pub net_pay: Decimal,
}

impl ComputedResult {
    /// Net pay is always `income - tax`; nothing is clamped. `None` when the
    /// difference is out of `Decimal` range.
    pub fn new(record_id: i64, income: Decimal, tax: Decimal) -> Option<Self> {
        Some(Self {
            record_id,
            tax,
            net_pay: income.checked_sub(tax)?,
        })
    }
}
