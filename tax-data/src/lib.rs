//! Rate data for the lifetime tax estimator.
//!
//! Bracket tables are CSV files with the columns
//! `jurisdiction,year,min_income,max_income,rate`; surtax schedules use
//! `jurisdiction,year,lower_threshold,lower_rate,upper_threshold,upper_rate`.
//! Canadian federal and provincial tables are bundled into the crate and
//! exposed through [`TaxRates::bundled`].

pub mod loader;
pub mod rates;

pub use loader::{BracketRecord, FEDERAL, RateDataError, RateTableLoader, SurtaxRecord};
pub use rates::TaxRates;
