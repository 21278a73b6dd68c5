use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A progressive bracket. Lower bound exclusive, upper bound inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLine {
    pub jurisdiction_id: i32,
    pub order_number: i32,
    pub lower_limit: Decimal,
    pub upper_limit: Decimal,
    /// Percentage, e.g. `20` for 20%.
    pub rate: Decimal,
}

impl BracketLine {
    pub fn contains(&self, income: Decimal) -> bool {
        income > self.lower_limit && income <= self.upper_limit
    }
}
