//! Provincial surtax levied on provincial tax otherwise payable.
//!
//! The surtax stacks two rates: one on the part of the base provincial tax
//! above a lower threshold and another on the part above an upper
//! threshold. Thresholds change year to year and are looked up like
//! bracket sets.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;
use crate::calculations::bracket::{BracketError, calculate_tax};
use crate::calculations::year::resolve_year;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurtaxError {
    #[error("{jurisdiction}: surtax schedule is empty")]
    Empty { jurisdiction: String },

    #[error("{jurisdiction} {year}: lower threshold {lower} exceeds upper threshold {upper}")]
    InvertedThresholds {
        jurisdiction: String,
        year: i32,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("{jurisdiction} {year}: surtax rates and thresholds must not be negative")]
    Negative { jurisdiction: String, year: i32 },

    #[error("{jurisdiction} {year}: surtax on {base_tax} overflows")]
    Overflow {
        jurisdiction: String,
        year: i32,
        base_tax: Decimal,
    },
}

/// Surtax parameters in force for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxThresholds {
    pub lower_threshold: Decimal,
    pub lower_rate: Decimal,
    pub upper_threshold: Decimal,
    pub upper_rate: Decimal,
}

impl SurtaxThresholds {
    /// Additional tax on `base_tax`. Zero up to and including the lower
    /// threshold, continuous and non-decreasing above it.
    ///
    /// `None` when the surtax does not fit in a `Decimal`.
    pub fn surtax(
        &self,
        base_tax: Decimal,
    ) -> Option<Decimal> {
        let portion = |threshold: Decimal, rate: Decimal| {
            if base_tax > threshold {
                (base_tax - threshold).checked_mul(rate)
            } else {
                Some(Decimal::ZERO)
            }
        };

        portion(self.lower_threshold, self.lower_rate)?
            .checked_add(portion(self.upper_threshold, self.upper_rate)?)
    }
}

/// Year-indexed surtax thresholds for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSurtaxSchedule")]
pub struct SurtaxSchedule {
    jurisdiction: String,
    years: BTreeMap<i32, SurtaxThresholds>,
}

#[derive(Deserialize)]
struct RawSurtaxSchedule {
    jurisdiction: String,
    years: BTreeMap<i32, SurtaxThresholds>,
}

impl TryFrom<RawSurtaxSchedule> for SurtaxSchedule {
    type Error = SurtaxError;

    fn try_from(raw: RawSurtaxSchedule) -> Result<Self, Self::Error> {
        let mut schedule = SurtaxSchedule::new(raw.jurisdiction);
        for (year, thresholds) in raw.years {
            schedule.insert(year, thresholds)?;
        }
        Ok(schedule)
    }
}

impl SurtaxSchedule {
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            years: BTreeMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        year: i32,
        thresholds: SurtaxThresholds,
    ) -> Result<(), SurtaxError> {
        let values = [
            thresholds.lower_threshold,
            thresholds.lower_rate,
            thresholds.upper_threshold,
            thresholds.upper_rate,
        ];
        if values.iter().any(|v| v.is_sign_negative() && !v.is_zero()) {
            return Err(SurtaxError::Negative {
                jurisdiction: self.jurisdiction.clone(),
                year,
            });
        }
        if thresholds.lower_threshold > thresholds.upper_threshold {
            return Err(SurtaxError::InvertedThresholds {
                jurisdiction: self.jurisdiction.clone(),
                year,
                lower: thresholds.lower_threshold,
                upper: thresholds.upper_threshold,
            });
        }
        self.years.insert(year, thresholds);
        Ok(())
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    /// Thresholds in force for `year`: the latest tabulated year at or
    /// before it, else the earliest tabulated year.
    pub fn thresholds(
        &self,
        year: i32,
    ) -> Result<&SurtaxThresholds, SurtaxError> {
        resolve_year(&self.years, year)
            .map(|(_, thresholds)| thresholds)
            .ok_or_else(|| SurtaxError::Empty {
                jurisdiction: self.jurisdiction.clone(),
            })
    }

    /// Surtax on `base_tax` for `year`.
    pub fn surtax(
        &self,
        base_tax: Decimal,
        year: i32,
    ) -> Result<Decimal, SurtaxError> {
        self.thresholds(year)?
            .surtax(base_tax)
            .ok_or_else(|| SurtaxError::Overflow {
                jurisdiction: self.jurisdiction.clone(),
                year,
                base_tax,
            })
    }
}

/// Bracket tax on `income` plus the surtax on that tax.
pub fn tax_with_surtax(
    income: Decimal,
    brackets: &[TaxBracket],
    thresholds: &SurtaxThresholds,
) -> Result<Decimal, BracketError> {
    let base = calculate_tax(income, brackets)?;
    thresholds
        .surtax(base)
        .and_then(|surtax| base.checked_add(surtax))
        .ok_or(BracketError::Overflow(income))
}

/// Marginal rate including the surtax, as the tax on one more dollar.
///
/// The published bracket rate understates the marginal burden once the
/// surtax thresholds are crossed, so the rate is the finite difference
/// `tax(income + 1) - tax(income)` of [`tax_with_surtax`].
pub fn true_marginal_rate(
    income: Decimal,
    brackets: &[TaxBracket],
    thresholds: &SurtaxThresholds,
) -> Result<Decimal, BracketError> {
    let at_income = tax_with_surtax(income, brackets, thresholds)?;
    let next_income = income
        .checked_add(Decimal::ONE)
        .ok_or(BracketError::Overflow(income))?;
    let next_dollar = tax_with_surtax(next_income, brackets, thresholds)?;
    Ok(next_dollar - at_income)
}
