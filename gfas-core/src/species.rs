//! Chemical species vocabulary
//!
//! Emission-factor reports name species in free text (e.g. `"NOx_as_NO"`), while gridded
//! output fields are identified by short codes (e.g. `"nox"`). [`Species`] fixes the mapping
//! between the two so that an unknown name fails at a single point.
//!
//! ```rust
//! use gfas_core::species::Species;
//!
//! let nox = Species::from_report_name("NOx_as_NO").unwrap();
//! assert_eq!(nox.code(), "nox");
//! assert_eq!("nox".parse::<Species>().unwrap(), nox);
//! ```

use crate::errors::GfasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chemical species with a biomass-burning emission factor.
///
/// Serialised using the short code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "c2h4o")]
    Acetaldehyde,
    #[serde(rename = "c3h6o")]
    Acetone,
    #[serde(rename = "bc")]
    BlackCarbon,
    #[serde(rename = "c6h6")]
    Benzene,
    #[serde(rename = "c4h10")]
    Butanes,
    #[serde(rename = "c4h8")]
    Butenes,
    #[serde(rename = "c")]
    Carbon,
    #[serde(rename = "c2h4")]
    Ethene,
    #[serde(rename = "c2h6")]
    Ethane,
    #[serde(rename = "c3h6")]
    Propene,
    #[serde(rename = "c3h8")]
    Propane,
    #[serde(rename = "ch4")]
    Methane,
    #[serde(rename = "co")]
    CarbonMonoxide,
    #[serde(rename = "co2")]
    CarbonDioxide,
    #[serde(rename = "c2h6s")]
    DimethylSulfide,
    #[serde(rename = "c2h5oh")]
    Ethanol,
    #[serde(rename = "ch2oh")]
    Formaldehyde,
    #[serde(rename = "h2")]
    Hydrogen,
    #[serde(rename = "c7h16")]
    Heptanes,
    #[serde(rename = "c6h14")]
    Hexanes,
    #[serde(rename = "c6h12")]
    Hexene,
    #[serde(rename = "hialkanes")]
    HigherAlkanes,
    #[serde(rename = "hialkenes")]
    HigherAlkenes,
    #[serde(rename = "c5h8")]
    Isoprene,
    #[serde(rename = "ch3oh")]
    Methanol,
    #[serde(rename = "n2o")]
    NitrousOxide,
    #[serde(rename = "nh3")]
    Ammonia,
    #[serde(rename = "nmhc")]
    NonMethaneHydrocarbons,
    #[serde(rename = "nox")]
    NitrogenOxides,
    #[serde(rename = "oc")]
    OrganicCarbon,
    #[serde(rename = "c8h16")]
    Octenes,
    #[serde(rename = "pm2p5")]
    Pm2p5,
    #[serde(rename = "c5h12")]
    Pentane,
    #[serde(rename = "c5h10")]
    Pentenes,
    #[serde(rename = "so2")]
    SulfurDioxide,
    #[serde(rename = "tc")]
    TotalCarbon,
    #[serde(rename = "tpm")]
    TotalParticulateMatter,
    #[serde(rename = "terpenes")]
    Terpenes,
    #[serde(rename = "c7h8")]
    Toluene,
    #[serde(rename = "toluene")]
    TolueneLump,
    #[serde(rename = "c8h10")]
    Xylenes,
}

impl Species {
    /// Every species in the vocabulary, in report order
    pub const ALL: [Species; 41] = [
        Species::Acetaldehyde,
        Species::Acetone,
        Species::BlackCarbon,
        Species::Benzene,
        Species::Butanes,
        Species::Butenes,
        Species::Carbon,
        Species::Ethene,
        Species::Ethane,
        Species::Propene,
        Species::Propane,
        Species::Methane,
        Species::CarbonMonoxide,
        Species::CarbonDioxide,
        Species::DimethylSulfide,
        Species::Ethanol,
        Species::Formaldehyde,
        Species::Hydrogen,
        Species::Heptanes,
        Species::Hexanes,
        Species::Hexene,
        Species::HigherAlkanes,
        Species::HigherAlkenes,
        Species::Isoprene,
        Species::Methanol,
        Species::NitrousOxide,
        Species::Ammonia,
        Species::NonMethaneHydrocarbons,
        Species::NitrogenOxides,
        Species::OrganicCarbon,
        Species::Octenes,
        Species::Pm2p5,
        Species::Pentane,
        Species::Pentenes,
        Species::SulfurDioxide,
        Species::TotalCarbon,
        Species::TotalParticulateMatter,
        Species::Terpenes,
        Species::Toluene,
        Species::TolueneLump,
        Species::Xylenes,
    ];

    /// Name used for this species in the emission-factor report
    pub fn report_name(self) -> &'static str {
        match self {
            Species::Acetaldehyde => "Acetaldehyde",
            Species::Acetone => "Acetone",
            Species::BlackCarbon => "BC_or_EC",
            Species::Benzene => "Benzene",
            Species::Butanes => "Butanes",
            Species::Butenes => "Butenes",
            Species::Carbon => "C",
            Species::Ethene => "C2H4",
            Species::Ethane => "C2H6",
            Species::Propene => "C3H6",
            Species::Propane => "C3H8",
            Species::Methane => "CH4",
            Species::CarbonMonoxide => "CO",
            Species::CarbonDioxide => "CO2",
            Species::DimethylSulfide => "DMS",
            Species::Ethanol => "Ethanol",
            Species::Formaldehyde => "Formaldehyde",
            Species::Hydrogen => "H2",
            Species::Heptanes => "Heptanes",
            Species::Hexanes => "Hexanes",
            Species::Hexene => "Hexene",
            Species::HigherAlkanes => "Higher_Alkanes",
            Species::HigherAlkenes => "Higher_Alkenes",
            Species::Isoprene => "Isoprene",
            Species::Methanol => "Methanol",
            Species::NitrousOxide => "N2O",
            Species::Ammonia => "NH3",
            Species::NonMethaneHydrocarbons => "NMHC_sum",
            Species::NitrogenOxides => "NOx_as_NO",
            Species::OrganicCarbon => "OC",
            Species::Octenes => "Octenes",
            Species::Pm2p5 => "PM2.5",
            Species::Pentane => "Pentane",
            Species::Pentenes => "Pentenes",
            Species::SulfurDioxide => "SO2",
            Species::TotalCarbon => "TC",
            Species::TotalParticulateMatter => "TPM",
            Species::Terpenes => "Terpenes",
            Species::Toluene => "Toluene",
            Species::TolueneLump => "Toluene_lump",
            Species::Xylenes => "Xylenes",
        }
    }

    /// Short code used to identify gridded fields of this species
    pub fn code(self) -> &'static str {
        match self {
            Species::Acetaldehyde => "c2h4o",
            Species::Acetone => "c3h6o",
            Species::BlackCarbon => "bc",
            Species::Benzene => "c6h6",
            Species::Butanes => "c4h10",
            Species::Butenes => "c4h8",
            Species::Carbon => "c",
            Species::Ethene => "c2h4",
            Species::Ethane => "c2h6",
            Species::Propene => "c3h6",
            Species::Propane => "c3h8",
            Species::Methane => "ch4",
            Species::CarbonMonoxide => "co",
            Species::CarbonDioxide => "co2",
            Species::DimethylSulfide => "c2h6s",
            Species::Ethanol => "c2h5oh",
            Species::Formaldehyde => "ch2oh",
            Species::Hydrogen => "h2",
            Species::Heptanes => "c7h16",
            Species::Hexanes => "c6h14",
            Species::Hexene => "c6h12",
            Species::HigherAlkanes => "hialkanes",
            Species::HigherAlkenes => "hialkenes",
            Species::Isoprene => "c5h8",
            Species::Methanol => "ch3oh",
            Species::NitrousOxide => "n2o",
            Species::Ammonia => "nh3",
            Species::NonMethaneHydrocarbons => "nmhc",
            Species::NitrogenOxides => "nox",
            Species::OrganicCarbon => "oc",
            Species::Octenes => "c8h16",
            Species::Pm2p5 => "pm2p5",
            Species::Pentane => "c5h12",
            Species::Pentenes => "c5h10",
            Species::SulfurDioxide => "so2",
            Species::TotalCarbon => "tc",
            Species::TotalParticulateMatter => "tpm",
            Species::Terpenes => "terpenes",
            Species::Toluene => "c7h8",
            Species::TolueneLump => "toluene",
            Species::Xylenes => "c8h10",
        }
    }

    /// Look up a species by its report name
    pub fn from_report_name(name: &str) -> Option<Species> {
        Species::ALL.into_iter().find(|s| s.report_name() == name)
    }

    /// Look up a species by its short code
    pub fn from_code(code: &str) -> Option<Species> {
        Species::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Species {
    type Err = GfasError;

    /// Parse a short code, falling back to the report name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::from_code(s)
            .or_else(|| Species::from_report_name(s))
            .ok_or_else(|| GfasError::Config(format!("Unknown species {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_and_names_are_unique() {
        let codes: HashSet<_> = Species::ALL.iter().map(|s| s.code()).collect();
        let names: HashSet<_> = Species::ALL.iter().map(|s| s.report_name()).collect();
        assert_eq!(codes.len(), Species::ALL.len());
        assert_eq!(names.len(), Species::ALL.len());
    }

    #[test]
    fn test_report_name_roundtrip() {
        for species in Species::ALL {
            assert_eq!(Species::from_report_name(species.report_name()), Some(species));
            assert_eq!(Species::from_code(species.code()), Some(species));
        }
    }

    #[test]
    fn test_known_mappings() {
        assert_eq!(Species::from_report_name("NOx_as_NO"), Some(Species::NitrogenOxides));
        assert_eq!(Species::from_report_name("PM2.5").unwrap().code(), "pm2p5");
        assert_eq!(Species::from_report_name("DMS").unwrap().code(), "c2h6s");
        assert_eq!(Species::from_report_name("Toluene_lump").unwrap().code(), "toluene");
        assert_eq!(Species::from_report_name("Toluene").unwrap().code(), "c7h8");
        assert_eq!(Species::from_report_name("NOx"), None);
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Species::CarbonMonoxide).unwrap();
        assert_eq!(json, "\"co\"");
        for species in Species::ALL {
            let json = serde_json::to_string(&species).unwrap();
            assert_eq!(json, format!("\"{}\"", species.code()));
        }
    }

    #[test]
    fn test_parse_from_code_or_name() {
        assert_eq!("nh3".parse::<Species>().unwrap(), Species::Ammonia);
        assert_eq!("NH3".parse::<Species>().unwrap(), Species::Ammonia);
        assert!(matches!(
            "xx".parse::<Species>(),
            Err(GfasError::Config(_))
        ));
    }
}
