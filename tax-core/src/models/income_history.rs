use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejections raised when validating user-supplied income.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IncomeHistoryError {
    #[error("income for {year} is negative ({income})")]
    NegativeIncome { year: i32, income: Decimal },

    #[error("year {year} is in the future (current year is {current_year})")]
    FutureYear { year: i32, current_year: i32 },
}

/// A set of year → gross income facts.
///
/// Years are unique; inserting a year twice keeps the last value.
/// Iteration is in ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncomeHistory(BTreeMap<i32, Decimal>);

impl IncomeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        year: i32,
        income: Decimal,
    ) -> Option<Decimal> {
        self.0.insert(year, income)
    }

    pub fn get(
        &self,
        year: i32,
    ) -> Option<Decimal> {
        self.0.get(&year).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, Decimal)> + '_ {
        self.0.iter().map(|(year, income)| (*year, *income))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks every entry: incomes must be non-negative and no year may lie
    /// after `current_year`. Zero income is accepted.
    pub fn validate(
        &self,
        current_year: i32,
    ) -> Result<(), IncomeHistoryError> {
        for (year, income) in self.iter() {
            if year > current_year {
                return Err(IncomeHistoryError::FutureYear { year, current_year });
            }
            if income.is_sign_negative() && !income.is_zero() {
                return Err(IncomeHistoryError::NegativeIncome { year, income });
            }
        }
        Ok(())
    }
}

impl FromIterator<(i32, Decimal)> for IncomeHistory {
    fn from_iter<T: IntoIterator<Item = (i32, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn iterates_in_year_order() {
        let history: IncomeHistory = [(2023, dec!(3)), (2001, dec!(1)), (2010, dec!(2))]
            .into_iter()
            .collect();

        let years: Vec<i32> = history.iter().map(|(y, _)| y).collect();

        assert_eq!(years, vec![2001, 2010, 2023]);
    }

    #[test]
    fn validate_accepts_zero_income() {
        let history: IncomeHistory = [(2020, dec!(0))].into_iter().collect();

        assert_eq!(history.validate(2024), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_income() {
        let history: IncomeHistory = [(2020, dec!(-1))].into_iter().collect();

        assert_eq!(
            history.validate(2024),
            Err(IncomeHistoryError::NegativeIncome {
                year: 2020,
                income: dec!(-1)
            })
        );
    }

    #[test]
    fn validate_rejects_future_year() {
        let history: IncomeHistory = [(2030, dec!(1000))].into_iter().collect();

        assert_eq!(
            history.validate(2024),
            Err(IncomeHistoryError::FutureYear {
                year: 2030,
                current_year: 2024
            })
        );
    }

    #[test]
    fn validate_accepts_current_year() {
        let history: IncomeHistory = [(2024, dec!(1000))].into_iter().collect();

        assert!(history.validate(2024).is_ok());
    }

    #[test]
    fn serializes_as_year_keyed_map() {
        let history: IncomeHistory = [(2023, dec!(80000))].into_iter().collect();

        let json = serde_json::to_string(&history).unwrap();

        assert_eq!(json, r#"{"2023":"80000"}"#);
    }
}
