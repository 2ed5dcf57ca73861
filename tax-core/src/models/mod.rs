mod income_history;
mod jurisdiction;
mod rate_table;
mod saved_income;
mod tax_bracket;
mod tax_result;

pub use income_history::{IncomeHistory, IncomeHistoryError};
pub use jurisdiction::Jurisdiction;
pub use rate_table::{RateTable, RateTableError};
pub use saved_income::{SavedIncomeData, StoredIncomeData};
pub use tax_bracket::TaxBracket;
pub use tax_result::{LifetimeTaxResult, YearlyTaxResult};
