use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Meaning of a row in the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateCode {
    /// Fixed amount charged under the flat regime (`FLATRATE`).
    FlatRate,
    /// Income the flat regime must exceed before it applies (`THRES`).
    Threshold,
    /// Any other code, or none: the percentage rate.
    Percentage,
}

impl RateCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlatRate => "FLATRATE",
            Self::Threshold => "THRES",
            Self::Percentage => "PERC",
        }
    }

    /// Matching ignores case and surrounding whitespace.
    pub fn parse(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
            Some("FLATRATE") => Self::FlatRate,
            Some("THRES") => Self::Threshold,
            _ => Self::Percentage,
        }
    }
}

/// One row of the rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub jurisdiction_id: i32,
    pub rate: Decimal,
    pub rate_code: RateCode,
}
