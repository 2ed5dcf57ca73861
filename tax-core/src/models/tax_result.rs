use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Federal and provincial tax for one year of income.
///
/// Amounts and rates serialize as plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTaxResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub federal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub provincial: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub federal_marginal_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub provincial_marginal_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub combined_marginal_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_rate: Decimal,
}

/// Per-year breakdown plus the lifetime sum of `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeTaxResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub by_year: BTreeMap<i32, YearlyTaxResult>,
}

impl LifetimeTaxResult {
    /// Sum of federal tax across all years.
    pub fn federal_total(&self) -> Decimal {
        self.by_year.values().map(|y| y.federal).sum()
    }

    /// Sum of provincial tax (surtax included) across all years.
    pub fn provincial_total(&self) -> Decimal {
        self.by_year.values().map(|y| y.provincial).sum()
    }
}
