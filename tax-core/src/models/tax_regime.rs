use serde::{Deserialize, Serialize};

/// How a jurisdiction computes tax.
///
/// Decided once when a pending record is read, so the per-record dispatch is
/// a `match` rather than a string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    Progressive,
    Percentage,
    Flat,
    /// A code none of the strategies recognise. The raw code is kept for
    /// reporting; an absent code is stored as an empty string.
    Unknown(String),
}

impl TaxRegime {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Progressive => "PROG",
            Self::Percentage => "PERC",
            Self::Flat => "FLAT",
            Self::Unknown(code) => code,
        }
    }

    /// Maps a store regime code onto a variant. Matching ignores case and
    /// surrounding whitespace; both the short and the long spellings are
    /// accepted.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "PROG" | "PROGRESSIVE" => Self::Progressive,
            "PERC" | "PERCENTAGE" => Self::Percentage,
            "FLAT" => Self::Flat,
            _ => Self::Unknown(code.to_string()),
        }
    }

    pub fn from_optional(code: Option<&str>) -> Self {
        code.map_or_else(|| Self::Unknown(String::new()), Self::parse)
    }
}
