use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::year::resolve_year;
use crate::models::TaxBracket;

/// Reasons a bracket set is rejected as configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("{jurisdiction}: no tax brackets for {year}")]
    NoBrackets { jurisdiction: String, year: i32 },

    #[error("{jurisdiction} {year}: first bracket starts at {min} instead of 0")]
    NonZeroStart {
        jurisdiction: String,
        year: i32,
        min: Decimal,
    },

    #[error("{jurisdiction} {year}: bracket starting at {min} does not follow previous bound {expected}")]
    NotContiguous {
        jurisdiction: String,
        year: i32,
        min: Decimal,
        expected: Decimal,
    },

    #[error("{jurisdiction} {year}: bracket [{min}, {max}] is empty or inverted")]
    EmptyBracket {
        jurisdiction: String,
        year: i32,
        min: Decimal,
        max: Decimal,
    },

    #[error("{jurisdiction} {year}: only the last bracket may be unbounded")]
    UnboundedBeforeLast { jurisdiction: String, year: i32 },

    #[error("{jurisdiction} {year}: last bracket must be unbounded")]
    BoundedTop { jurisdiction: String, year: i32 },

    #[error("{jurisdiction} {year}: rate {rate} is outside [0, 1]")]
    RateOutOfRange {
        jurisdiction: String,
        year: i32,
        rate: Decimal,
    },

    #[error("{jurisdiction}: rate table is empty")]
    Empty { jurisdiction: String },
}

/// Year-indexed history of bracket sets for one jurisdiction.
///
/// Each entry is in force from its year until a later entry supersedes it.
/// Every stored bracket set has been checked by [`RateTable::insert`], so
/// callers can rely on brackets being sorted, contiguous from zero and
/// ending in an unbounded bracket. Deserialized tables pass through the
/// same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRateTable")]
pub struct RateTable {
    jurisdiction: String,
    years: BTreeMap<i32, Vec<TaxBracket>>,
}

#[derive(Deserialize)]
struct RawRateTable {
    jurisdiction: String,
    years: BTreeMap<i32, Vec<TaxBracket>>,
}

impl TryFrom<RawRateTable> for RateTable {
    type Error = RateTableError;

    fn try_from(raw: RawRateTable) -> Result<Self, Self::Error> {
        let mut table = RateTable::new(raw.jurisdiction);
        for (year, brackets) in raw.years {
            table.insert(year, brackets)?;
        }
        Ok(table)
    }
}

impl RateTable {
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            years: BTreeMap::new(),
        }
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Adds the bracket set effective from `year`, replacing any set
    /// already stored for that year.
    ///
    /// Brackets are sorted by `min_income` before validation; the sorted
    /// set must start at zero, be gap-free and end with an unbounded bracket.
    pub fn insert(
        &mut self,
        year: i32,
        mut brackets: Vec<TaxBracket>,
    ) -> Result<(), RateTableError> {
        brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
        self.validate(year, &brackets)?;
        self.years.insert(year, brackets);
        Ok(())
    }

    /// Builder-style [`RateTable::insert`].
    pub fn with_year(
        mut self,
        year: i32,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, RateTableError> {
        self.insert(year, brackets)?;
        Ok(self)
    }

    /// Returns the bracket set in force for `year` together with the
    /// tabulated year it came from.
    ///
    /// # Errors
    /// [`RateTableError::Empty`] when nothing has been tabulated.
    pub fn resolve(
        &self,
        year: i32,
    ) -> Result<(i32, &[TaxBracket]), RateTableError> {
        resolve_year(&self.years, year)
            .map(|(y, brackets)| (y, brackets.as_slice()))
            .ok_or_else(|| RateTableError::Empty {
                jurisdiction: self.jurisdiction.clone(),
            })
    }

    /// Tabulated years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    fn validate(
        &self,
        year: i32,
        brackets: &[TaxBracket],
    ) -> Result<(), RateTableError> {
        let jurisdiction = || self.jurisdiction.clone();

        let first = brackets.first().ok_or_else(|| RateTableError::NoBrackets {
            jurisdiction: jurisdiction(),
            year,
        })?;
        if !first.min_income.is_zero() {
            return Err(RateTableError::NonZeroStart {
                jurisdiction: jurisdiction(),
                year,
                min: first.min_income,
            });
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RateTableError::RateOutOfRange {
                    jurisdiction: jurisdiction(),
                    year,
                    rate: bracket.rate,
                });
            }

            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(RateTableError::EmptyBracket {
                        jurisdiction: jurisdiction(),
                        year,
                        min: bracket.min_income,
                        max,
                    });
                }
                Some(_) if index == last_index => {
                    return Err(RateTableError::BoundedTop {
                        jurisdiction: jurisdiction(),
                        year,
                    });
                }
                None if index != last_index => {
                    return Err(RateTableError::UnboundedBeforeLast {
                        jurisdiction: jurisdiction(),
                        year,
                    });
                }
                _ => {}
            }

            if let Some(next) = brackets.get(index + 1) {
                // Unbounded-before-last was rejected above.
                let expected = bracket.max_income.unwrap_or(Decimal::MAX);
                if next.min_income != expected {
                    return Err(RateTableError::NotContiguous {
                        jurisdiction: jurisdiction(),
                        year,
                        min: next.min_income,
                        expected,
                    });
                }
            }
        }

        Ok(())
    }
}
