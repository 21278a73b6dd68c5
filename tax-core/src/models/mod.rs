mod bracket_line;
mod computed_result;
mod jurisdiction_tax_rules;
mod pending_record;
mod rule_table;
mod tax_rate;
mod tax_regime;

pub use bracket_line::BracketLine;
pub use computed_result::ComputedResult;
pub use jurisdiction_tax_rules::JurisdictionTaxRules;
pub use pending_record::{NewPendingRecord, PendingRecord};
pub use rule_table::RuleTable;
pub use tax_rate::{RateCode, TaxRate};
pub use tax_regime::TaxRegime;
