//! Federal and provincial rate tables, keyed by jurisdiction.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use lifetax_core::{Jurisdiction, LifetimeTaxCalculator, RateTable, SurtaxSchedule};
use tracing::{debug, info};

use crate::loader::{FEDERAL, RateDataError, RateTableLoader};

const BUNDLED_FEDERAL: &str = include_str!("../data/federal.csv");
const BUNDLED_PROVINCIAL: &str = include_str!("../data/provincial.csv");
const BUNDLED_SURTAX: &str = include_str!("../data/surtax.csv");

/// File names looked up by [`TaxRates::from_dir`].
pub const FEDERAL_FILE: &str = "federal.csv";
pub const PROVINCIAL_FILE: &str = "provincial.csv";
pub const SURTAX_FILE: &str = "surtax.csv";

/// Every rate table the calculator needs, loaded once and passed around
/// by reference.
#[derive(Debug, Clone)]
pub struct TaxRates {
    federal: RateTable,
    provincial: HashMap<Jurisdiction, RateTable>,
    surtax: HashMap<Jurisdiction, SurtaxSchedule>,
}

impl TaxRates {
    /// Canadian rates shipped with the crate.
    pub fn bundled() -> Result<Self, RateDataError> {
        Self::from_readers(
            BUNDLED_FEDERAL.as_bytes(),
            BUNDLED_PROVINCIAL.as_bytes(),
            Some(BUNDLED_SURTAX.as_bytes()),
        )
    }

    /// Loads `federal.csv`, `provincial.csv` and, if present, `surtax.csv`
    /// from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, RateDataError> {
        let open = |name: &str| {
            let path = dir.join(name);
            File::open(&path).map_err(|source| RateDataError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        let federal = open(FEDERAL_FILE)?;
        let provincial = open(PROVINCIAL_FILE)?;
        let surtax = if dir.join(SURTAX_FILE).is_file() {
            Some(open(SURTAX_FILE)?)
        } else {
            None
        };

        info!(dir = %dir.display(), "loading rate tables");
        Self::from_readers(federal, provincial, surtax)
    }

    /// Builds the tables from CSV sources.
    ///
    /// The federal source may only contain `federal` rows and the
    /// provincial source only recognised provincial codes.
    pub fn from_readers<F, P, S>(
        federal: F,
        provincial: P,
        surtax: Option<S>,
    ) -> Result<Self, RateDataError>
    where
        F: Read,
        P: Read,
        S: Read,
    {
        let mut federal_tables = RateTableLoader::build_tables(&RateTableLoader::parse(federal)?)?;
        let federal = federal_tables
            .remove(FEDERAL)
            .ok_or(RateDataError::MissingFederal)?;
        if let Some(code) = federal_tables.into_keys().next() {
            return Err(RateDataError::UnknownJurisdiction(code));
        }

        // Fold aliases such as `on` into the canonical code before grouping.
        let provincial_records = RateTableLoader::parse(provincial)?
            .into_iter()
            .map(|mut record| {
                let jurisdiction =
                    Jurisdiction::parse(&record.jurisdiction).ok_or_else(|| {
                        RateDataError::UnknownJurisdiction(record.jurisdiction.clone())
                    })?;
                record.jurisdiction = jurisdiction.as_str().to_string();
                Ok(record)
            })
            .collect::<Result<Vec<_>, RateDataError>>()?;

        let provincial = RateTableLoader::build_tables(&provincial_records)?
            .into_iter()
            .map(|(code, table)| {
                Jurisdiction::parse(&code)
                    .map(|jurisdiction| (jurisdiction, table))
                    .ok_or(RateDataError::UnknownJurisdiction(code))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let surtax: BTreeMap<_, _> = match surtax {
            Some(reader) => RateTableLoader::build_surtax(&RateTableLoader::parse_surtax(reader)?)?,
            None => BTreeMap::new(),
        };

        debug!(
            federal_years = federal.years().len(),
            provinces = provincial.len(),
            surtaxes = surtax.len(),
            "rate tables loaded"
        );

        Ok(Self {
            federal,
            provincial,
            surtax: surtax.into_iter().collect(),
        })
    }

    pub fn federal(&self) -> &RateTable {
        &self.federal
    }

    /// Provincial table for `jurisdiction`; missing tables are a
    /// configuration error.
    pub fn provincial(
        &self,
        jurisdiction: Jurisdiction,
    ) -> Result<&RateTable, RateDataError> {
        self.provincial
            .get(&jurisdiction)
            .ok_or(RateDataError::MissingProvincial(jurisdiction))
    }

    /// Surtax levied on provincial tax, for the jurisdictions that have one.
    pub fn surtax(
        &self,
        jurisdiction: Jurisdiction,
    ) -> Option<&SurtaxSchedule> {
        self.surtax.get(&jurisdiction)
    }

    /// Jurisdictions with a provincial table, in code order.
    pub fn jurisdictions(&self) -> Vec<Jurisdiction> {
        let mut jurisdictions: Vec<_> = self.provincial.keys().copied().collect();
        jurisdictions.sort_unstable();
        jurisdictions
    }

    /// Calculator wired with the federal table, the province's table and,
    /// where one exists, its surtax.
    pub fn calculator(
        &self,
        jurisdiction: Jurisdiction,
    ) -> Result<LifetimeTaxCalculator<'_>, RateDataError> {
        let calculator = LifetimeTaxCalculator::new(&self.federal, self.provincial(jurisdiction)?);
        Ok(match self.surtax(jurisdiction) {
            Some(schedule) => calculator.with_surtax(schedule),
            None => calculator,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const FEDERAL_CSV: &str = "\
jurisdiction,year,min_income,max_income,rate
federal,2020,0,50000,0.15
federal,2020,50000,,0.20
";

    const PROVINCIAL_CSV: &str = "\
jurisdiction,year,min_income,max_income,rate
alberta,2020,0,,0.10
ontario,2020,0,,0.05
";

    const SURTAX_CSV: &str = "\
jurisdiction,year,lower_threshold,lower_rate,upper_threshold,upper_rate
ontario,2020,100,0.20,200,0.36
";

    fn rates() -> TaxRates {
        TaxRates::from_readers(
            FEDERAL_CSV.as_bytes(),
            PROVINCIAL_CSV.as_bytes(),
            Some(SURTAX_CSV.as_bytes()),
        )
        .expect("valid rates")
    }

    #[test]
    fn from_readers_keys_provincial_tables_by_jurisdiction() {
        let rates = rates();

        assert_eq!(
            rates.jurisdictions(),
            vec![Jurisdiction::Alberta, Jurisdiction::Ontario]
        );
        assert_eq!(rates.federal().years(), vec![2020]);
    }

    #[test]
    fn missing_provincial_table_is_an_error() {
        let rates = rates();

        let result = rates.provincial(Jurisdiction::Yukon);

        assert!(matches!(
            result,
            Err(RateDataError::MissingProvincial(Jurisdiction::Yukon))
        ));
    }

    #[test]
    fn federal_file_must_contain_federal_rows() {
        let result = TaxRates::from_readers(
            PROVINCIAL_CSV.as_bytes(),
            PROVINCIAL_CSV.as_bytes(),
            None::<&[u8]>,
        );

        assert!(matches!(result, Err(RateDataError::MissingFederal)));
    }

    #[test]
    fn federal_file_rejects_other_jurisdictions() {
        let mixed = format!("{FEDERAL_CSV}alberta,2020,0,,0.10\n");

        let result = TaxRates::from_readers(mixed.as_bytes(), PROVINCIAL_CSV.as_bytes(), None::<&[u8]>);

        assert!(matches!(result, Err(RateDataError::UnknownJurisdiction(code)) if code == "alberta"));
    }

    #[test]
    fn provincial_file_rejects_unknown_codes() {
        let csv = "jurisdiction,year,min_income,max_income,rate\natlantis,2020,0,,0.10\n";

        let result = TaxRates::from_readers(FEDERAL_CSV.as_bytes(), csv.as_bytes(), None::<&[u8]>);

        assert!(matches!(result, Err(RateDataError::UnknownJurisdiction(_))));
    }

    #[test]
    fn provincial_aliases_merge_into_one_table() {
        let csv = "\
jurisdiction,year,min_income,max_income,rate
ontario,2020,0,,0.05
on,2022,0,,0.09
";

        let rates =
            TaxRates::from_readers(FEDERAL_CSV.as_bytes(), csv.as_bytes(), None::<&[u8]>).unwrap();

        assert_eq!(rates.jurisdictions(), vec![Jurisdiction::Ontario]);
        assert_eq!(
            rates.provincial(Jurisdiction::Ontario).unwrap().years(),
            vec![2020, 2022]
        );
    }

    #[test]
    fn provincial_alias_rows_for_same_year_conflict() {
        let csv = "\
jurisdiction,year,min_income,max_income,rate
ontario,2020,0,,0.05
ON,2020,0,,0.09
";

        let result = TaxRates::from_readers(FEDERAL_CSV.as_bytes(), csv.as_bytes(), None::<&[u8]>);

        assert!(matches!(result, Err(RateDataError::RateTable(_))));
    }

    #[test]
    fn calculator_applies_surtax_only_where_tabulated() {
        let rates = rates();
        let history: lifetax_core::IncomeHistory = [(2020, dec!(10000))].into_iter().collect();

        let alberta = rates
            .calculator(Jurisdiction::Alberta)
            .unwrap()
            .calculate(&history)
            .unwrap();
        let ontario = rates
            .calculator(Jurisdiction::Ontario)
            .unwrap()
            .calculate(&history)
            .unwrap();

        assert_eq!(alberta.by_year[&2020].provincial, dec!(1000));
        // Base 500: 20% of 400 plus 36% of 300
        assert_eq!(ontario.by_year[&2020].provincial, dec!(500) + dec!(80) + dec!(108));
    }
}
