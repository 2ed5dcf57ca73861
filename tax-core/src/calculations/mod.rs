//! Tax calculations over progressive bracket tables.
//!
//! [`bracket`] holds the per-year bracket arithmetic, [`year`] the lookup of
//! sparse year-indexed tables, [`surtax`] the provincial surtax layer, and
//! [`lifetime`] the orchestration over an entire income history.

pub mod bracket;
pub mod common;
pub mod lifetime;
pub mod surtax;
pub mod year;

pub use bracket::{BracketError, calculate_tax, marginal_rate};
pub use lifetime::{CalculationError, LifetimeTaxCalculator};
pub use surtax::{SurtaxError, SurtaxSchedule, SurtaxThresholds, tax_with_surtax, true_marginal_rate};
pub use year::resolve_year;
