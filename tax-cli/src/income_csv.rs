//! CSV loader for income histories.
//!
//! ## CSV Format
//!
//! | Column   | Required | Type    | Notes                          |
//! |----------|----------|---------|--------------------------------|
//! | `year`   | yes      | integer | Calendar year, e.g. `2023`     |
//! | `income` | yes      | decimal | Taxable income, e.g. `80000`   |
//!
//! Each year may appear at most once. Incomes must be non-negative (zero
//! is allowed) and no year may lie after the current calendar year.
//!
//! ```csv
//! year,income
//! 2021,52000
//! 2022,61000.50
//! 2023,80000
//! ```

use std::path::Path;

use lifetax_core::{IncomeHistory, IncomeHistoryError};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    year: i32,
    income: Decimal,
}

/// Errors that can occur while loading an income history.
#[derive(Debug, thiserror::Error)]
pub enum IncomeCsvError {
    /// Bad structure, missing column or a value that is not a number.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based, the header being row 0.
    #[error("year {year} appears more than once (row {row})")]
    DuplicateYear { year: i32, row: usize },

    #[error(transparent)]
    Invalid(#[from] IncomeHistoryError),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Parse CSV text into an [`IncomeHistory`] and validate it against
/// `current_year`.
pub fn load_from_str(
    input: &str,
    current_year: i32,
) -> Result<IncomeHistory, IncomeCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let mut history = IncomeHistory::new();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        if history.insert(row.year, row.income).is_some() {
            return Err(IncomeCsvError::DuplicateYear {
                year: row.year,
                row: idx + 1,
            });
        }
    }

    history.validate(current_year)?;
    Ok(history)
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    current_year: i32,
) -> Result<IncomeHistory, IncomeCsvError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IncomeCsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents, current_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const CURRENT_YEAR: i32 = 2025;

    #[test]
    fn parses_rows_in_year_order() {
        let csv = "year,income\n2023,80000\n2021,52000\n2022,61000.50\n";

        let history = load_from_str(csv, CURRENT_YEAR).unwrap();

        let rows: Vec<_> = history.iter().collect();
        assert_eq!(
            rows,
            vec![
                (2021, dec!(52000)),
                (2022, dec!(61000.50)),
                (2023, dec!(80000)),
            ]
        );
    }

    #[test]
    fn tolerates_whitespace_and_column_order() {
        let csv = "income , year\n 80000 , 2023 \n";

        let history = load_from_str(csv, CURRENT_YEAR).unwrap();

        assert_eq!(history.get(2023), Some(dec!(80000)));
    }

    #[test]
    fn header_only_is_empty_history() {
        let history = load_from_str("year,income\n", CURRENT_YEAR).unwrap();

        assert!(history.is_empty());
    }

    #[test]
    fn zero_income_is_accepted() {
        let history = load_from_str("year,income\n2020,0\n", CURRENT_YEAR).unwrap();

        assert_eq!(history.get(2020), Some(dec!(0)));
    }

    #[test]
    fn duplicate_year_is_rejected() {
        let csv = "year,income\n2021,1\n2022,2\n2021,3\n";

        let result = load_from_str(csv, CURRENT_YEAR);

        assert!(matches!(
            result,
            Err(IncomeCsvError::DuplicateYear { year: 2021, row: 3 })
        ));
    }

    #[test]
    fn negative_income_is_rejected() {
        let result = load_from_str("year,income\n2021,-5\n", CURRENT_YEAR);

        assert!(matches!(result, Err(IncomeCsvError::Invalid(_))));
    }

    #[test]
    fn future_year_is_rejected() {
        let result = load_from_str("year,income\n2026,5\n", CURRENT_YEAR);

        assert!(matches!(result, Err(IncomeCsvError::Invalid(_))));
    }

    #[test]
    fn non_numeric_income_is_a_parse_error() {
        let result = load_from_str("year,income\n2021,lots\n", CURRENT_YEAR);

        assert!(matches!(result, Err(IncomeCsvError::Parse(_))));
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let result = load_from_str("year\n2021\n", CURRENT_YEAR);

        assert!(matches!(result, Err(IncomeCsvError::Parse(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let result = load_from_file(Path::new("no/such/income.csv"), CURRENT_YEAR);

        assert!(matches!(result, Err(IncomeCsvError::Io { path, .. }) if path.contains("income.csv")));
    }
}
