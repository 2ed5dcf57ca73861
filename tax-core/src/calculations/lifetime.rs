//! Lifetime aggregation of federal and provincial tax over an income history.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use lifetax_core::calculations::LifetimeTaxCalculator;
//! use lifetax_core::{IncomeHistory, RateTable, TaxBracket};
//!
//! let federal = RateTable::new("federal")
//!     .with_year(2020, vec![
//!         TaxBracket::new(dec!(0), Some(dec!(50000)), dec!(0.15)),
//!         TaxBracket::new(dec!(50000), None, dec!(0.20)),
//!     ])
//!     .unwrap();
//! let provincial = RateTable::new("alberta")
//!     .with_year(2020, vec![TaxBracket::new(dec!(0), None, dec!(0.10))])
//!     .unwrap();
//!
//! let history: IncomeHistory = [(2021, dec!(60000))].into_iter().collect();
//! let result = LifetimeTaxCalculator::new(&federal, &provincial)
//!     .calculate(&history)
//!     .unwrap();
//!
//! assert_eq!(result.by_year[&2021].federal, dec!(9500));
//! assert_eq!(result.by_year[&2021].provincial, dec!(6000));
//! assert_eq!(result.total, dec!(15500));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::bracket::{BracketError, calculate_tax, marginal_rate};
use crate::calculations::surtax::{SurtaxError, SurtaxSchedule, tax_with_surtax, true_marginal_rate};
use crate::{IncomeHistory, LifetimeTaxResult, RateTable, RateTableError, YearlyTaxResult};

/// Errors that abort a lifetime calculation.
///
/// Any failure rejects the whole request; no year is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// A rate table is empty or otherwise unusable.
    #[error("rate configuration: {0}")]
    RateTable(#[from] RateTableError),

    /// The surtax schedule for the province is unusable.
    #[error("surtax configuration: {0}")]
    Surtax(#[from] SurtaxError),

    /// Bracket tax could not be computed for one year.
    #[error("{jurisdiction} tax for {year}: {source}")]
    Bracket {
        jurisdiction: String,
        year: i32,
        source: BracketError,
    },

    /// Combining the taxes of `year` into a total does not fit in a
    /// `Decimal`.
    #[error("tax totals overflow at {year}")]
    Overflow { year: i32 },
}

/// Applies a federal and a provincial rate table (plus an optional
/// provincial surtax) to each year of an income history.
#[derive(Debug, Clone, Copy)]
pub struct LifetimeTaxCalculator<'a> {
    federal: &'a RateTable,
    provincial: &'a RateTable,
    surtax: Option<&'a SurtaxSchedule>,
}

impl<'a> LifetimeTaxCalculator<'a> {
    pub fn new(
        federal: &'a RateTable,
        provincial: &'a RateTable,
    ) -> Self {
        Self {
            federal,
            provincial,
            surtax: None,
        }
    }

    /// Applies `schedule` on top of provincial bracket tax. The provincial
    /// marginal rate then comes from [`true_marginal_rate`].
    pub fn with_surtax(
        mut self,
        schedule: &'a SurtaxSchedule,
    ) -> Self {
        self.surtax = Some(schedule);
        self
    }

    /// Computes every year of `history` independently and sums the totals.
    ///
    /// An empty history yields a zero result. Rate tables are checked first:
    /// an empty table is a configuration error even when there is nothing
    /// to compute.
    pub fn calculate(
        &self,
        history: &IncomeHistory,
    ) -> Result<LifetimeTaxResult, CalculationError> {
        for table in [self.federal, self.provincial] {
            if table.is_empty() {
                return Err(RateTableError::Empty {
                    jurisdiction: table.jurisdiction().to_string(),
                }
                .into());
            }
        }

        let mut result = LifetimeTaxResult::default();
        for (year, income) in history.iter() {
            let yearly = self.calculate_year(year, income)?;
            result.total = result
                .total
                .checked_add(yearly.total)
                .ok_or(CalculationError::Overflow { year })?;
            result.by_year.insert(year, yearly);
        }

        debug!(
            years = result.by_year.len(),
            total = %result.total,
            "lifetime tax calculated"
        );
        Ok(result)
    }

    /// Federal and provincial tax for a single year.
    pub fn calculate_year(
        &self,
        year: i32,
        income: Decimal,
    ) -> Result<YearlyTaxResult, CalculationError> {
        let (federal_year, federal_brackets) = self.federal.resolve(year)?;
        let (provincial_year, provincial_brackets) = self.provincial.resolve(year)?;

        let federal_error = |source| CalculationError::Bracket {
            jurisdiction: self.federal.jurisdiction().to_string(),
            year,
            source,
        };
        let provincial_error = |source| CalculationError::Bracket {
            jurisdiction: self.provincial.jurisdiction().to_string(),
            year,
            source,
        };

        let federal = calculate_tax(income, federal_brackets).map_err(federal_error)?;
        let federal_marginal_rate =
            marginal_rate(income, federal_brackets).map_err(federal_error)?;

        let (provincial, provincial_marginal_rate) = match self.surtax {
            Some(schedule) => {
                let thresholds = schedule.thresholds(year)?;
                (
                    tax_with_surtax(income, provincial_brackets, thresholds)
                        .map_err(provincial_error)?,
                    true_marginal_rate(income, provincial_brackets, thresholds)
                        .map_err(provincial_error)?,
                )
            }
            None => (
                calculate_tax(income, provincial_brackets).map_err(provincial_error)?,
                marginal_rate(income, provincial_brackets).map_err(provincial_error)?,
            ),
        };

        let overflow = || CalculationError::Overflow { year };
        let total = federal.checked_add(provincial).ok_or_else(overflow)?;
        let effective_rate = if income > Decimal::ZERO {
            total.checked_div(income).ok_or_else(overflow)?
        } else {
            Decimal::ZERO
        };
        let combined_marginal_rate = federal_marginal_rate
            .checked_add(provincial_marginal_rate)
            .ok_or_else(overflow)?;

        debug!(
            year,
            federal_year,
            provincial_year,
            %income,
            %total,
            "year calculated"
        );

        Ok(YearlyTaxResult {
            federal,
            provincial,
            total,
            federal_marginal_rate,
            provincial_marginal_rate,
            combined_marginal_rate,
            effective_rate,
        })
    }
}
