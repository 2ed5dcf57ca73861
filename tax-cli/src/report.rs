//! Rendering of lifetime results as a text table, CSV or JSON.

use std::fmt::Write as _;

use clap::ValueEnum;
use lifetax_core::calculations::common::{format_percent, round_half_up, round_rate};
use lifetax_core::{IncomeHistory, Jurisdiction, LifetimeTaxResult, YearlyTaxResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HEADERS: [&str; 9] = [
    "year",
    "income",
    "federal",
    "provincial",
    "total",
    "federal_marginal",
    "provincial_marginal",
    "combined_marginal",
    "effective",
];

/// Output format for calculation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Comma-separated values
    Csv,
    /// JSON object with `total` and `byYear`
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders `result` in `format`. `history` supplies the income column for
/// the table and CSV forms.
pub fn render(
    result: &LifetimeTaxResult,
    history: &IncomeHistory,
    jurisdiction: Jurisdiction,
    format: OutputFormat,
) -> Result<String, ReportError> {
    match format {
        OutputFormat::Table => Ok(render_table(result, history, jurisdiction)),
        OutputFormat::Csv => render_csv(result, history),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)? + "\n"),
    }
}

fn income_of(
    history: &IncomeHistory,
    year: i32,
) -> Decimal {
    history.get(year).unwrap_or_default()
}

fn row_cells(
    year: i32,
    income: Decimal,
    result: &YearlyTaxResult,
) -> [String; 9] {
    [
        year.to_string(),
        round_half_up(income).to_string(),
        round_half_up(result.federal).to_string(),
        round_half_up(result.provincial).to_string(),
        round_half_up(result.total).to_string(),
        format_percent(result.federal_marginal_rate),
        format_percent(result.provincial_marginal_rate),
        format_percent(result.combined_marginal_rate),
        format_percent(result.effective_rate),
    ]
}

fn render_table(
    result: &LifetimeTaxResult,
    history: &IncomeHistory,
    jurisdiction: Jurisdiction,
) -> String {
    let headers = [
        "Year", "Income", "Federal", "Provincial", "Total", "Fed. marg.", "Prov. marg.",
        "Comb. marg.", "Effective",
    ];

    let mut rows: Vec<[String; 9]> = result
        .by_year
        .iter()
        .map(|(&year, yearly)| row_cells(year, income_of(history, year), yearly))
        .collect();

    let income_total: Decimal = history.iter().map(|(_, income)| income).sum();
    let effective = if income_total > Decimal::ZERO {
        format_percent(result.total / income_total)
    } else {
        format_percent(Decimal::ZERO)
    };
    rows.push([
        "Lifetime".to_string(),
        round_half_up(income_total).to_string(),
        round_half_up(result.federal_total()).to_string(),
        round_half_up(result.provincial_total()).to_string(),
        round_half_up(result.total).to_string(),
        String::new(),
        String::new(),
        String::new(),
        effective,
    ]);

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", jurisdiction.name());

    let line = |out: &mut String, cells: &[&str]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(&mut out, &headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&mut out, &rule.iter().map(String::as_str).collect::<Vec<_>>());

    let (lifetime, years) = rows.split_last().map_or((None, &rows[..]), |(l, y)| (Some(l), y));
    for row in years {
        line(&mut out, &row.iter().map(String::as_str).collect::<Vec<_>>());
    }
    if let Some(lifetime) = lifetime {
        line(&mut out, &rule.iter().map(String::as_str).collect::<Vec<_>>());
        line(&mut out, &lifetime.iter().map(String::as_str).collect::<Vec<_>>());
    }

    out
}

fn render_csv(
    result: &LifetimeTaxResult,
    history: &IncomeHistory,
) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for (&year, yearly) in &result.by_year {
        writer.write_record([
            year.to_string(),
            income_of(history, year).to_string(),
            round_half_up(yearly.federal).to_string(),
            round_half_up(yearly.provincial).to_string(),
            round_half_up(yearly.total).to_string(),
            yearly.federal_marginal_rate.normalize().to_string(),
            yearly.provincial_marginal_rate.normalize().to_string(),
            yearly.combined_marginal_rate.normalize().to_string(),
            round_rate(yearly.effective_rate).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
