//! Wiring between the command line and the library crates.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local};
use lifetax_core::db::{DbConfig, RepositoryRegistry};
use lifetax_core::{IncomeHistory, IncomeHistoryStore, Jurisdiction, LifetimeTaxResult};
use lifetax_data::TaxRates;
use lifetax_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

/// Registry with every storage backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Rate tables from `rates_dir`, or the bundled ones.
pub fn load_rates(rates_dir: Option<&Path>) -> Result<TaxRates> {
    match rates_dir {
        Some(dir) => TaxRates::from_dir(dir)
            .with_context(|| format!("loading rate tables from '{}'", dir.display())),
        None => TaxRates::bundled().context("loading bundled rate tables"),
    }
}

pub fn calculate(
    rates: &TaxRates,
    jurisdiction: Jurisdiction,
    history: &IncomeHistory,
) -> Result<LifetimeTaxResult> {
    let result = rates
        .calculator(jurisdiction)?
        .calculate(history)
        .with_context(|| format!("calculating lifetime tax for {}", jurisdiction.name()))?;

    info!(
        province = %jurisdiction,
        years = result.by_year.len(),
        total = %result.total,
        "lifetime tax calculated"
    );
    Ok(result)
}

pub async fn open_store(
    db: &DbConfig,
    retention_days: i64,
) -> Result<IncomeHistoryStore> {
    debug!("connecting to {} backend", db.backend);
    let repo = build_registry()
        .create(db)
        .await
        .with_context(|| format!("opening '{}' database '{}'", db.backend, db.connection_string))?;

    Ok(IncomeHistoryStore::new(repo).with_retention(Duration::days(retention_days)))
}

/// One line per jurisdiction: code, name, first and last tabulated year,
/// and whether a surtax applies.
pub fn provinces_table(rates: &TaxRates) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24}  {:<26}  {:>5}  {:>5}  {}",
        "Code", "Name", "From", "To", "Surtax"
    );

    for jurisdiction in rates.jurisdictions() {
        let years = rates
            .provincial(jurisdiction)
            .map(|table| table.years())
            .unwrap_or_default();
        let first = years.first().map(i32::to_string).unwrap_or_default();
        let last = years.last().map(i32::to_string).unwrap_or_default();
        let surtax = if rates.surtax(jurisdiction).is_some() {
            "yes"
        } else {
            "no"
        };

        let _ = writeln!(
            out,
            "{:<24}  {:<26}  {:>5}  {:>5}  {}",
            jurisdiction.as_str(),
            jurisdiction.name(),
            first,
            last,
            surtax
        );
    }
    out
}

/// Writes `text` to `output`, or to stdout when no path is given.
pub fn write_output(
    text: &str,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing '{}'", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => print!("{text}"),
    }
    Ok(())
}
