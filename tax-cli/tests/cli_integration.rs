//! End-to-end checks of the loader, calculator and renderers against the
//! bundled rate tables and on-disk fixtures.

use std::path::{Path, PathBuf};

use lifetax_cli::config::Config;
use lifetax_cli::income_csv::{self, IncomeCsvError};
use lifetax_cli::report::{self, OutputFormat};
use lifetax_cli::app;
use lifetax_core::Jurisdiction;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const CURRENT_YEAR: i32 = 2025;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

// ============================================================================
// Income CSV
// ============================================================================

#[test]
fn loads_fixture_history() {
    let history = income_csv::load_from_file(&fixture("income.csv"), CURRENT_YEAR).unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history.get(2023), Some(dec!(80000)));
}

#[test]
fn rejects_fixture_with_duplicate_year() {
    let result = income_csv::load_from_file(&fixture("duplicate_year.csv"), CURRENT_YEAR);

    assert!(matches!(
        result,
        Err(IncomeCsvError::DuplicateYear { year: 2022, .. })
    ));
}

// ============================================================================
// Calculation and rendering
// ============================================================================

#[test]
fn ontario_history_applies_surtax_in_2024() {
    let rates = app::load_rates(None).unwrap();
    let history = income_csv::load_from_file(&fixture("income.csv"), CURRENT_YEAR).unwrap();

    let result = app::calculate(&rates, Jurisdiction::Ontario, &history).unwrap();

    assert_eq!(result.by_year.len(), 3);
    let y2024 = &result.by_year[&2024];
    // 120000 in 2024 puts Ontario base tax above both surtax thresholds.
    assert!(y2024.provincial_marginal_rate > dec!(0.1116));
    assert_eq!(
        result.total,
        result.by_year.values().map(|y| y.total).sum()
    );
}

#[test]
fn csv_report_has_row_per_year() {
    let rates = app::load_rates(None).unwrap();
    let history = income_csv::load_from_file(&fixture("income.csv"), CURRENT_YEAR).unwrap();
    let result = app::calculate(&rates, Jurisdiction::Alberta, &history).unwrap();

    let csv = report::render(&result, &history, Jurisdiction::Alberta, OutputFormat::Csv).unwrap();

    let years: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(years, vec!["2022", "2023", "2024"]);
}

#[test]
fn json_report_round_trips_to_result() {
    let rates = app::load_rates(None).unwrap();
    let history = income_csv::load_from_file(&fixture("income.csv"), CURRENT_YEAR).unwrap();
    let result = app::calculate(&rates, Jurisdiction::Quebec, &history).unwrap();

    let json = report::render(&result, &history, Jurisdiction::Quebec, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let by_year = value["byYear"].as_object().unwrap();
    assert_eq!(
        by_year.keys().cloned().collect::<Vec<_>>(),
        vec!["2022", "2023", "2024"]
    );
    for fields in by_year.values() {
        for key in [
            "federal",
            "provincial",
            "total",
            "federalMarginalRate",
            "provincialMarginalRate",
            "combinedMarginalRate",
            "effectiveRate",
        ] {
            assert!(fields[key].is_number(), "{key}");
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn fixture_config_overrides_defaults() {
    let config = Config::load(Some(&fixture("lifetax.toml"))).unwrap();

    assert_eq!(
        Jurisdiction::resolve(&config.default_province),
        Jurisdiction::PrinceEdwardIsland
    );
    assert_eq!(config.retention_days, 90);
    assert_eq!(config.format, OutputFormat::Csv);
    assert_eq!(config.database.connection_string, ":memory:");
}
