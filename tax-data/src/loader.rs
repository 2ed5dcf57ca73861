use std::collections::BTreeMap;
use std::io::Read;

use lifetax_core::{
    Jurisdiction, RateTable, RateTableError, SurtaxError, SurtaxSchedule, SurtaxThresholds,
    TaxBracket,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Code used in the `jurisdiction` column for federal brackets.
pub const FEDERAL: &str = "federal";

/// Errors that can occur when loading rate data.
#[derive(Debug, Error)]
pub enum RateDataError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown jurisdiction '{0}'")]
    UnknownJurisdiction(String),

    #[error("Invalid rate table: {0}")]
    RateTable(#[from] RateTableError),

    #[error("Invalid surtax schedule: {0}")]
    Surtax(#[from] SurtaxError),

    #[error("No federal rates found")]
    MissingFederal,

    #[error("No provincial rates for {0}")]
    MissingProvincial(Jurisdiction),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl From<csv::Error> for RateDataError {
    fn from(err: csv::Error) -> Self {
        RateDataError::CsvParse(err.to_string())
    }
}

/// One bracket row of a rate CSV file.
///
/// - `jurisdiction`: `federal` or a provincial code such as `ontario`
/// - `year`: first year the bracket set applies to
/// - `min_income`: lower bound of the bracket
/// - `max_income`: upper bound (empty for unlimited)
/// - `rate`: marginal rate as a decimal (e.g. 0.15 for 15%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub jurisdiction: String,
    pub year: i32,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// One row of a surtax CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SurtaxRecord {
    pub jurisdiction: String,
    pub year: i32,
    pub lower_threshold: Decimal,
    pub lower_rate: Decimal,
    pub upper_threshold: Decimal,
    pub upper_rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn open_csv<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Loader for rate tables and surtax schedules from CSV.
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse bracket records from any `Read` source.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, RateDataError> {
        let mut csv_reader = open_csv(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse surtax records from any `Read` source.
    pub fn parse_surtax<R: Read>(reader: R) -> Result<Vec<SurtaxRecord>, RateDataError> {
        let mut csv_reader = open_csv(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SurtaxRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by jurisdiction code and year into validated tables.
    ///
    /// Codes are lowercased; every (jurisdiction, year) group becomes one
    /// bracket set and must pass [`RateTable::insert`] validation.
    pub fn build_tables(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<String, RateTable>, RateDataError> {
        let mut groups: BTreeMap<(String, i32), Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            groups
                .entry((record.jurisdiction.to_ascii_lowercase(), record.year))
                .or_default()
                .push(TaxBracket::new(
                    record.min_income,
                    record.max_income,
                    record.rate,
                ));
        }

        let mut tables: BTreeMap<String, RateTable> = BTreeMap::new();
        for ((code, year), brackets) in groups {
            tables
                .entry(code.clone())
                .or_insert_with(|| RateTable::new(code))
                .insert(year, brackets)?;
        }

        Ok(tables)
    }

    /// Build one surtax schedule per jurisdiction. Codes must name a
    /// provincial jurisdiction.
    pub fn build_surtax(
        records: &[SurtaxRecord]
    ) -> Result<BTreeMap<Jurisdiction, SurtaxSchedule>, RateDataError> {
        let mut schedules: BTreeMap<Jurisdiction, SurtaxSchedule> = BTreeMap::new();

        for record in records {
            let jurisdiction = Jurisdiction::parse(&record.jurisdiction)
                .ok_or_else(|| RateDataError::UnknownJurisdiction(record.jurisdiction.clone()))?;

            schedules
                .entry(jurisdiction)
                .or_insert_with(|| SurtaxSchedule::new(jurisdiction.as_str()))
                .insert(
                    record.year,
                    SurtaxThresholds {
                        lower_threshold: record.lower_threshold,
                        lower_rate: record.lower_rate,
                        upper_threshold: record.upper_threshold,
                        upper_rate: record.upper_rate,
                    },
                )?;
        }

        Ok(schedules)
    }
}
