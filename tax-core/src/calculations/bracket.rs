//! Progressive bracket taxation.
//!
//! Both functions take brackets sorted ascending by `min_income`, starting at
//! zero, gap-free, and ending in an unbounded bracket. [`crate::RateTable`]
//! guarantees this for every bracket set it hands out. Brackets that break
//! the ordering are reported as [`BracketError`], never repaired.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::TaxBracket;

/// Errors raised by the bracket functions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketError {
    /// No tax brackets were provided for the calculation.
    #[error("no tax brackets provided")]
    NoBrackets,

    /// Income below zero is outside the calculation's contract.
    #[error("income {0} is negative")]
    NegativeIncome(Decimal),

    /// A bracket did not start where the previous one ended.
    #[error("bracket starting at {min} does not continue from {expected}")]
    NotContiguous { min: Decimal, expected: Decimal },

    /// Income lies above the last (bounded) bracket.
    #[error("no tax bracket covers income {0}")]
    Uncovered(Decimal),

    /// The tax on `income` does not fit in a `Decimal`.
    #[error("tax on income {0} overflows")]
    Overflow(Decimal),
}

/// Total tax owed on `income` under progressive taxation.
///
/// Each bracket that `income` exceeds contributes
/// `rate * (min(income, max) - min)`; the scan stops at the bracket
/// containing `income`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use lifetax_core::TaxBracket;
/// use lifetax_core::calculations::bracket::calculate_tax;
///
/// let brackets = vec![
///     TaxBracket::new(dec!(0), Some(dec!(50000)), dec!(0.10)),
///     TaxBracket::new(dec!(50000), None, dec!(0.20)),
/// ];
///
/// assert_eq!(calculate_tax(dec!(60000), &brackets).unwrap(), dec!(7000));
/// ```
///
/// # Errors
///
/// Returns [`BracketError`] if no brackets are given, `income` is negative,
/// the brackets are not contiguous from zero, or the tax overflows.
pub fn calculate_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Result<Decimal, BracketError> {
    if brackets.is_empty() {
        return Err(BracketError::NoBrackets);
    }
    if income < Decimal::ZERO {
        return Err(BracketError::NegativeIncome(income));
    }

    let mut tax = Decimal::ZERO;
    let mut expected_min = Decimal::ZERO;

    for bracket in brackets {
        if bracket.min_income != expected_min {
            return Err(BracketError::NotContiguous {
                min: bracket.min_income,
                expected: expected_min,
            });
        }

        if income > bracket.min_income {
            let top = bracket.max_income.map_or(income, |max| income.min(max));
            tax = (top - bracket.min_income)
                .checked_mul(bracket.rate)
                .and_then(|slice| tax.checked_add(slice))
                .ok_or(BracketError::Overflow(income))?;
        }

        match bracket.max_income {
            Some(max) if income > max => expected_min = max,
            _ => return Ok(tax),
        }
    }

    Err(BracketError::Uncovered(income))
}

/// Rate applied to the next dollar earned above `income`.
///
/// This is the rate of the highest bracket whose `min_income` is strictly
/// below `income`. At exactly a bracket boundary the lower bracket's rate
/// applies. When no bracket qualifies (income of zero) the lowest bracket's
/// rate is returned.
pub fn marginal_rate(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Result<Decimal, BracketError> {
    let lowest = brackets
        .iter()
        .min_by_key(|b| b.min_income)
        .ok_or(BracketError::NoBrackets)?;

    let bracket = brackets
        .iter()
        .filter(|b| income > b.min_income)
        .max_by_key(|b| b.min_income)
        .unwrap_or(lowest);

    Ok(bracket.rate)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(50000)), dec!(0.10)),
            TaxBracket::new(dec!(50000), None, dec!(0.20)),
        ]
    }

    fn ontario_2024() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(51446)), dec!(0.0505)),
            TaxBracket::new(dec!(51446), Some(dec!(102894)), dec!(0.0915)),
            TaxBracket::new(dec!(102894), Some(dec!(150000)), dec!(0.1116)),
            TaxBracket::new(dec!(150000), Some(dec!(220000)), dec!(0.1216)),
            TaxBracket::new(dec!(220000), None, dec!(0.1316)),
        ]
    }

    // =========================================================================
    // calculate_tax tests
    // =========================================================================

    #[test]
    fn calculate_tax_zero_income_is_zero() {
        assert_eq!(calculate_tax(dec!(0), &two_brackets()), Ok(dec!(0)));
        assert_eq!(calculate_tax(dec!(0), &ontario_2024()), Ok(dec!(0)));
    }

    #[test]
    fn calculate_tax_spans_two_brackets() {
        let tax = calculate_tax(dec!(60000), &two_brackets()).unwrap();

        assert_eq!(tax, dec!(7000));
    }

    #[test]
    fn calculate_tax_at_boundary_uses_lower_bracket_only() {
        let tax = calculate_tax(dec!(50000), &two_brackets()).unwrap();

        assert_eq!(tax, dec!(5000));
    }

    #[test]
    fn calculate_tax_flat_bracket() {
        let brackets = vec![TaxBracket::new(dec!(0), None, dec!(0.10))];

        for income in [dec!(1), dec!(12345.67), dec!(1000000)] {
            assert_eq!(calculate_tax(income, &brackets).unwrap(), income * dec!(0.10));
        }
    }

    #[test]
    fn calculate_tax_top_bracket() {
        let tax = calculate_tax(dec!(250000), &ontario_2024()).unwrap();

        let expected = dec!(51446) * dec!(0.0505)
            + (dec!(102894) - dec!(51446)) * dec!(0.0915)
            + (dec!(150000) - dec!(102894)) * dec!(0.1116)
            + dec!(70000) * dec!(0.1216)
            + dec!(30000) * dec!(0.1316);
        assert_eq!(tax, expected);
    }

    #[test]
    fn calculate_tax_is_continuous_across_boundaries() {
        let brackets = ontario_2024();
        for boundary in [dec!(51446), dec!(102894), dec!(150000), dec!(220000)] {
            let below = calculate_tax(boundary - dec!(0.01), &brackets).unwrap();
            let at = calculate_tax(boundary, &brackets).unwrap();
            let above = calculate_tax(boundary + dec!(0.01), &brackets).unwrap();

            assert!(below <= at && at <= above);
            assert!(above - below < dec!(0.01));
        }
    }

    #[test]
    fn calculate_tax_is_non_decreasing() {
        let brackets = ontario_2024();
        let mut previous = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        while income <= dec!(300000) {
            let tax = calculate_tax(income, &brackets).unwrap();
            assert!(tax >= previous, "tax decreased at {income}");
            previous = tax;
            income += dec!(2500);
        }
    }

    #[test]
    fn calculate_tax_rejects_empty_brackets() {
        assert_eq!(calculate_tax(dec!(100), &[]), Err(BracketError::NoBrackets));
    }

    #[test]
    fn calculate_tax_rejects_negative_income() {
        assert_eq!(
            calculate_tax(dec!(-1), &two_brackets()),
            Err(BracketError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn calculate_tax_reports_gap() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0.01)),
            TaxBracket::new(dec!(1000.01), None, dec!(0.02)),
        ];

        assert_eq!(
            calculate_tax(dec!(5000), &brackets),
            Err(BracketError::NotContiguous {
                min: dec!(1000.01),
                expected: dec!(1000)
            })
        );
    }

    #[test]
    fn calculate_tax_reports_uncovered_income() {
        let brackets = vec![TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0.01))];

        assert_eq!(
            calculate_tax(dec!(5000), &brackets),
            Err(BracketError::Uncovered(dec!(5000)))
        );
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn calculate_tax_reports_overflow() {
        let brackets = vec![TaxBracket::new(dec!(0), None, dec!(2))];

        let result = calculate_tax(Decimal::MAX, &brackets);

        assert_eq!(result, Err(BracketError::Overflow(Decimal::MAX)));
    }

    #[test]
    fn calculate_tax_handles_largest_income_at_normal_rates() {
        let result = calculate_tax(Decimal::MAX, &ontario_2024());

        assert!(result.unwrap() < Decimal::MAX);
    }

    #[test]
    fn marginal_rate_at_boundary_is_lower_rate() {
        assert_eq!(marginal_rate(dec!(50000), &two_brackets()), Ok(dec!(0.10)));
    }

    #[test]
    fn marginal_rate_above_boundary_is_upper_rate() {
        assert_eq!(marginal_rate(dec!(50001), &two_brackets()), Ok(dec!(0.20)));
    }

    #[test]
    fn marginal_rate_zero_income_uses_lowest_bracket() {
        assert_eq!(marginal_rate(dec!(0), &two_brackets()), Ok(dec!(0.10)));
    }

    #[test]
    fn marginal_rate_ignores_bracket_order() {
        let mut brackets = ontario_2024();
        brackets.reverse();

        assert_eq!(marginal_rate(dec!(160000), &brackets), Ok(dec!(0.1216)));
        assert_eq!(marginal_rate(dec!(0), &brackets), Ok(dec!(0.0505)));
    }

    #[test]
    fn marginal_rate_rejects_empty_brackets() {
        assert_eq!(marginal_rate(dec!(100), &[]), Err(BracketError::NoBrackets));
    }
}
