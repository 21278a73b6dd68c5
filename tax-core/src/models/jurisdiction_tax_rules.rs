use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BracketLine;

/// Everything needed to tax an income in one jurisdiction.
///
/// Parameters the store never supplied stay at zero (or no brackets), so a
/// jurisdiction with only a bracket table still has a defined percentage and
/// flat configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionTaxRules {
    pub jurisdiction_id: i32,
    pub percentage_rate: Decimal,
    pub flat_rate: Decimal,
    pub flat_threshold: Decimal,
    /// In the order the store returned them.
    pub brackets: Vec<BracketLine>,
}

impl JurisdictionTaxRules {
    pub fn new(jurisdiction_id: i32) -> Self {
        Self {
            jurisdiction_id,
            ..Default::default()
        }
    }
}
