use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Canadian provinces and territories with tabulated provincial rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NorthwestTerritories,
    NovaScotia,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Jurisdiction {
    /// Used whenever a jurisdiction code is not recognised.
    pub const DEFAULT: Jurisdiction = Jurisdiction::Ontario;

    pub const ALL: [Jurisdiction; 12] = [
        Self::Alberta,
        Self::BritishColumbia,
        Self::Manitoba,
        Self::NewBrunswick,
        Self::NorthwestTerritories,
        Self::NovaScotia,
        Self::Nunavut,
        Self::Ontario,
        Self::PrinceEdwardIsland,
        Self::Quebec,
        Self::Saskatchewan,
        Self::Yukon,
    ];

    /// Canonical snake_case code, as used in the rate data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alberta => "alberta",
            Self::BritishColumbia => "british_columbia",
            Self::Manitoba => "manitoba",
            Self::NewBrunswick => "new_brunswick",
            Self::NorthwestTerritories => "northwest_territories",
            Self::NovaScotia => "nova_scotia",
            Self::Nunavut => "nunavut",
            Self::Ontario => "ontario",
            Self::PrinceEdwardIsland => "prince_edward_island",
            Self::Quebec => "quebec",
            Self::Saskatchewan => "saskatchewan",
            Self::Yukon => "yukon",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Alberta => "Alberta",
            Self::BritishColumbia => "British Columbia",
            Self::Manitoba => "Manitoba",
            Self::NewBrunswick => "New Brunswick",
            Self::NorthwestTerritories => "Northwest Territories",
            Self::NovaScotia => "Nova Scotia",
            Self::Nunavut => "Nunavut",
            Self::Ontario => "Ontario",
            Self::PrinceEdwardIsland => "Prince Edward Island",
            Self::Quebec => "Quebec",
            Self::Saskatchewan => "Saskatchewan",
            Self::Yukon => "Yukon",
        }
    }

    /// Case-insensitive lookup of a code, alias or postal abbreviation.
    /// Spaces and hyphens are read as underscores.
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match code.as_str() {
            "alberta" | "ab" => Some(Self::Alberta),
            "british_columbia" | "bc" => Some(Self::BritishColumbia),
            "manitoba" | "mb" => Some(Self::Manitoba),
            "new_brunswick" | "nb" => Some(Self::NewBrunswick),
            "northwest_territories" | "nwt" | "nt" => Some(Self::NorthwestTerritories),
            "nova_scotia" | "ns" => Some(Self::NovaScotia),
            "nunavut" | "nu" => Some(Self::Nunavut),
            "ontario" | "on" => Some(Self::Ontario),
            "prince_edward_island" | "pei" | "pe" => Some(Self::PrinceEdwardIsland),
            "quebec" | "qc" => Some(Self::Quebec),
            "saskatchewan" | "sk" => Some(Self::Saskatchewan),
            "yukon" | "yt" => Some(Self::Yukon),
            _ => None,
        }
    }

    /// Like [`Jurisdiction::parse`], falling back to [`Jurisdiction::DEFAULT`].
    pub fn resolve(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!(
                province = s,
                fallback = Self::DEFAULT.as_str(),
                "unrecognised province, using default"
            );
            Self::DEFAULT
        })
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}
