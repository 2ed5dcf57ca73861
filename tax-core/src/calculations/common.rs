//! Rounding helpers used when presenting results.
//!
//! Calculations themselves are carried out unrounded; these helpers are for
//! display and export only.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to cents using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use lifetax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate (0..1) to four decimal places, i.e. hundredths of a percent.
///
/// ```
/// use rust_decimal_macros::dec;
/// use lifetax_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(0.111649)), dec!(0.1116));
/// assert_eq!(round_rate(dec!(0.11165)), dec!(0.1117));
/// ```
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a rate as a percentage with two decimals, e.g. `0.2965` → `29.65%`.
pub fn format_percent(rate: Decimal) -> String {
    let percent = round_rate(rate) * Decimal::ONE_HUNDRED;
    format!("{:.2}%", percent)
}
