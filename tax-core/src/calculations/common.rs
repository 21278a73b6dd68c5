//! Common utility functions for tax calculations.

use rust_decimal::Decimal;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Applies a percentage rate to an amount.
///
/// Rates are stored as whole percentages (`15` means 15%). The division is
/// exact decimal arithmetic, so no rounding is introduced here. Returns
/// `None` when the product falls outside the range of `Decimal`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(15), dec!(2000)), Some(dec!(300)));
/// assert_eq!(percent_of(dec!(20), dec!(1000.01)), Some(dec!(200.002)));
/// ```
pub fn percent_of(
    rate: Decimal,
    amount: Decimal,
) -> Option<Decimal> {
    amount.checked_mul(rate.checked_div(ONE_HUNDRED)?)
}
