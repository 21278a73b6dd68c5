//! Tax computation strategies, one per regime.
//!
//! Every function here is pure: the inputs are a jurisdiction's parameters
//! and an income, the output is a tax amount. Nothing is rounded, so the
//! caller gets the exact decimal product, or `None` when that product does
//! not fit in a `Decimal`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{Evaluation, evaluate};
//! use tax_core::{JurisdictionTaxRules, TaxRegime};
//!
//! let mut rules = JurisdictionTaxRules::new(2);
//! rules.percentage_rate = dec!(15);
//!
//! let evaluation = evaluate(&TaxRegime::Percentage, &rules, dec!(2000));
//!
//! assert_eq!(evaluation, Evaluation::Taxed(dec!(300)));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::percent_of;
use crate::{BracketLine, JurisdictionTaxRules, TaxRegime};

/// Outcome of running a record's regime against its jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The regime was recognised and produced this tax (possibly zero).
    Taxed(Decimal),
    /// No strategy matches the regime code. Not a zero-tax result.
    UnknownRegime,
    /// The regime was recognised but the tax is out of `Decimal` range.
    Overflow,
}

/// Taxes the whole income at the rate of the first bracket that contains it.
///
/// Brackets are scanned in the order given. A bracket contains an income when
/// `lower_limit < income <= upper_limit`, so an income equal to a lower limit
/// belongs to the previous bracket, not this one. Returns zero when no
/// bracket matches.
pub fn progressive(
    brackets: &[BracketLine],
    income: Decimal,
) -> Option<Decimal> {
    match brackets.iter().find(|bracket| bracket.contains(income)) {
        Some(bracket) => percent_of(bracket.rate, income),
        None => Some(Decimal::ZERO),
    }
}

/// Taxes the whole income at a single rate.
pub fn percentage(
    rate: Decimal,
    income: Decimal,
) -> Option<Decimal> {
    percent_of(rate, income)
}

/// Charges `flat_rate` once income strictly exceeds `threshold`.
///
/// The amount is not capped at the income; a flat rate above the income
/// yields a negative net pay.
pub fn flat(
    flat_rate: Decimal,
    threshold: Decimal,
    income: Decimal,
) -> Decimal {
    if income > threshold {
        flat_rate
    } else {
        Decimal::ZERO
    }
}

/// Dispatches to the strategy for `regime`.
pub fn evaluate(
    regime: &TaxRegime,
    rules: &JurisdictionTaxRules,
    income: Decimal,
) -> Evaluation {
    let tax = match regime {
        TaxRegime::Progressive => progressive(&rules.brackets, income),
        TaxRegime::Percentage => percentage(rules.percentage_rate, income),
        TaxRegime::Flat => Some(flat(rules.flat_rate, rules.flat_threshold, income)),
        TaxRegime::Unknown(_) => return Evaluation::UnknownRegime,
    };

    tax.map_or(Evaluation::Overflow, Evaluation::Taxed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn test_brackets() -> Vec<BracketLine> {
        vec![
            BracketLine {
                jurisdiction_id: 1,
                order_number: 1,
                lower_limit: dec!(0),
                upper_limit: dec!(1000),
                rate: dec!(10),
            },
            BracketLine {
                jurisdiction_id: 1,
                order_number: 2,
                lower_limit: dec!(1000),
                upper_limit: dec!(5000),
                rate: dec!(20),
            },
        ]
    }

    fn test_rules() -> JurisdictionTaxRules {
        JurisdictionTaxRules {
            jurisdiction_id: 1,
            percentage_rate: dec!(15),
            flat_rate: dec!(50),
            flat_threshold: dec!(500),
            brackets: test_brackets(),
        }
    }

    // =========================================================================
    // progressive tests
    // =========================================================================

    #[test]
    fn progressive_first_bracket() {
        let result = progressive(&test_brackets(), dec!(500));

        assert_eq!(result, Some(dec!(50)));
    }

    #[test]
    fn progressive_upper_limit_is_inclusive() {
        let result = progressive(&test_brackets(), dec!(1000));

        assert_eq!(result, Some(dec!(100)));
    }

    #[test]
    fn progressive_just_above_upper_limit_moves_to_next_bracket() {
        let result = progressive(&test_brackets(), dec!(1000.01));

        assert_eq!(result, Some(dec!(200.002)));
    }

    #[test]
    fn progressive_lower_limit_is_exclusive() {
        // 0 is the lower limit of the first bracket and no earlier bracket exists.
        let result = progressive(&test_brackets(), dec!(0));

        assert_eq!(result, Some(Decimal::ZERO));
    }

    #[test]
    fn progressive_above_every_bracket_is_zero() {
        let result = progressive(&test_brackets(), dec!(5000.01));

        assert_eq!(result, Some(Decimal::ZERO));
    }

    #[test]
    fn progressive_top_of_last_bracket() {
        let result = progressive(&test_brackets(), dec!(5000));

        assert_eq!(result, Some(dec!(1000)));
    }

    #[test]
    fn progressive_no_brackets_is_zero() {
        let result = progressive(&[], dec!(1234));

        assert_eq!(result, Some(Decimal::ZERO));
    }

    #[test]
    fn progressive_first_match_wins_for_overlapping_brackets() {
        let mut brackets = test_brackets();
        brackets.push(BracketLine {
            jurisdiction_id: 1,
            order_number: 3,
            lower_limit: dec!(0),
            upper_limit: dec!(10000),
            rate: dec!(99),
        });

        let result = progressive(&brackets, dec!(2000));

        assert_eq!(result, Some(dec!(400)));
    }

    #[test]
    fn progressive_out_of_range_tax_is_none() {
        let brackets = vec![BracketLine {
            jurisdiction_id: 1,
            order_number: 1,
            lower_limit: dec!(0),
            upper_limit: Decimal::MAX,
            rate: dec!(150),
        }];

        assert_eq!(progressive(&brackets, Decimal::MAX), None);
        assert_eq!(progressive(&brackets, dec!(2000)), Some(dec!(3000)));
    }

    #[test]
    fn progressive_uses_stored_order_not_limits() {
        let mut brackets = test_brackets();
        brackets.reverse();

        // Order does not matter when brackets do not overlap.
        assert_eq!(progressive(&brackets, dec!(1000)), Some(dec!(100)));
        assert_eq!(progressive(&brackets, dec!(1000.01)), Some(dec!(200.002)));
    }

    // =========================================================================
    // percentage tests
    // =========================================================================

    #[test]
    fn percentage_applies_rate_to_income() {
        let result = percentage(dec!(15), dec!(2000));

        assert_eq!(result, Some(dec!(300)));
    }

    #[test]
    fn percentage_of_zero_income_is_zero() {
        let result = percentage(dec!(15), dec!(0));

        assert_eq!(result, Some(Decimal::ZERO));
    }

    #[test]
    fn percentage_zero_rate_is_zero() {
        let result = percentage(dec!(0), dec!(2000));

        assert_eq!(result, Some(Decimal::ZERO));
    }

    #[test]
    fn percentage_out_of_range_tax_is_none() {
        assert_eq!(percentage(dec!(150), Decimal::MAX), None);
    }

    // =========================================================================
    // flat tests
    // =========================================================================

    #[test]
    fn flat_at_threshold_is_zero() {
        let result = flat(dec!(50), dec!(500), dec!(500));

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn flat_above_threshold_charges_rate() {
        let result = flat(dec!(50), dec!(500), dec!(500.01));

        assert_eq!(result, dec!(50));
    }

    #[test]
    fn flat_below_threshold_is_zero() {
        let result = flat(dec!(50), dec!(500), dec!(10));

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn flat_is_not_capped_at_income() {
        let result = flat(dec!(50), dec!(0), dec!(20));

        assert_eq!(result, dec!(50));
    }

    // =========================================================================
    // evaluate tests
    // =========================================================================

    #[test]
    fn evaluate_dispatches_on_regime() {
        let rules = test_rules();

        assert_eq!(
            evaluate(&TaxRegime::Progressive, &rules, dec!(1000)),
            Evaluation::Taxed(dec!(100))
        );
        assert_eq!(
            evaluate(&TaxRegime::Percentage, &rules, dec!(2000)),
            Evaluation::Taxed(dec!(300))
        );
        assert_eq!(
            evaluate(&TaxRegime::Flat, &rules, dec!(500.01)),
            Evaluation::Taxed(dec!(50))
        );
    }

    #[test]
    fn evaluate_unknown_regime_is_flagged() {
        let rules = test_rules();

        let result = evaluate(&TaxRegime::Unknown("LUMP".to_string()), &rules, dec!(2000));

        assert_eq!(result, Evaluation::UnknownRegime);
    }

    #[test]
    fn evaluate_out_of_range_tax_is_overflow() {
        let mut rules = test_rules();
        rules.percentage_rate = dec!(150);

        assert_eq!(
            evaluate(&TaxRegime::Percentage, &rules, Decimal::MAX),
            Evaluation::Overflow
        );
        assert_eq!(
            evaluate(&TaxRegime::Percentage, &rules, dec!(2000)),
            Evaluation::Taxed(dec!(3000))
        );
    }

    #[test]
    fn evaluate_flat_never_overflows() {
        let mut rules = test_rules();
        rules.flat_rate = Decimal::MAX;

        assert_eq!(
            evaluate(&TaxRegime::Flat, &rules, Decimal::MAX),
            Evaluation::Taxed(Decimal::MAX)
        );
    }

    #[test]
    fn zero_rate_percentage_differs_from_unknown_regime() {
        let mut rules = test_rules();
        rules.percentage_rate = Decimal::ZERO;

        let zero = evaluate(&TaxRegime::Percentage, &rules, dec!(2000));
        let unknown = evaluate(&TaxRegime::Unknown(String::new()), &rules, dec!(2000));

        assert_eq!(zero, Evaluation::Taxed(Decimal::ZERO));
        assert_ne!(zero, unknown);
    }
}
