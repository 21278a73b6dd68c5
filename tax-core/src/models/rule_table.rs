use std::collections::HashMap;

use super::{BracketLine, JurisdictionTaxRules, RateCode, TaxRate};

/// Read-only map from jurisdiction id to its tax rules.
///
/// Built once per run and then shared between workers behind an `Arc`;
/// there is no way to mutate it after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: HashMap<i32, JurisdictionTaxRules>,
}

impl RuleTable {
    /// Folds the rate rows and the bracket lines into one table.
    ///
    /// An entry is created the first time a jurisdiction shows up in either
    /// input. Bracket lines are appended in the order given; the caller is
    /// responsible for handing them over sorted by `order_number`. When a
    /// jurisdiction has several rows for the same rate code the last one wins.
    pub fn from_rows(
        rates: impl IntoIterator<Item = TaxRate>,
        brackets: impl IntoIterator<Item = BracketLine>,
    ) -> Self {
        let mut rules: HashMap<i32, JurisdictionTaxRules> = HashMap::new();

        for rate in rates {
            let entry = rules
                .entry(rate.jurisdiction_id)
                .or_insert_with(|| JurisdictionTaxRules::new(rate.jurisdiction_id));
            match rate.rate_code {
                RateCode::FlatRate => entry.flat_rate = rate.rate,
                RateCode::Threshold => entry.flat_threshold = rate.rate,
                RateCode::Percentage => entry.percentage_rate = rate.rate,
            }
        }

        for line in brackets {
            rules
                .entry(line.jurisdiction_id)
                .or_insert_with(|| JurisdictionTaxRules::new(line.jurisdiction_id))
                .brackets
                .push(line);
        }

        Self { rules }
    }

    pub fn get(&self, jurisdiction_id: i32) -> Option<&JurisdictionTaxRules> {
        self.rules.get(&jurisdiction_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Total bracket lines across every jurisdiction.
    pub fn bracket_count(&self) -> usize {
        self.rules.values().map(|r| r.brackets.len()).sum()
    }
}
