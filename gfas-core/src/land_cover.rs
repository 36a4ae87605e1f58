//! Land cover classes used to select emission factors
//!
//! The dominant-land-cover field stores each cell's class as a floating-point code
//! `1..=8`. Emission-factor reports use their own vegetation-type vocabulary, which is
//! mapped onto six of these classes by [`LandCoverType`]. The remaining two classes are
//! open-burning variants that share their parent's emission factor.

use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dominant land cover class of a grid cell
///
/// The discriminant is the code stored in the land-cover field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LandCoverClass {
    /// Savannah and grassland
    #[serde(rename = "SA")]
    Savannah = 1,
    /// Savannah, open burning
    #[serde(rename = "SAOS")]
    SavannahOpenBurning = 2,
    /// Agricultural residue
    #[serde(rename = "AG")]
    Agriculture = 3,
    /// Agricultural residue, open burning
    #[serde(rename = "AGOS")]
    AgricultureOpenBurning = 4,
    /// Tropical forest
    #[serde(rename = "TF")]
    TropicalForest = 5,
    /// Peat
    #[serde(rename = "PEAT")]
    Peat = 6,
    /// Extratropical (temperate) forest
    #[serde(rename = "EF")]
    ExtratropicalForest = 7,
    /// Boreal forest
    #[serde(rename = "EFOS")]
    BorealForest = 8,
}

impl LandCoverClass {
    /// All classes in canonical (grid code) order
    pub const ALL: [LandCoverClass; 8] = [
        LandCoverClass::Savannah,
        LandCoverClass::SavannahOpenBurning,
        LandCoverClass::Agriculture,
        LandCoverClass::AgricultureOpenBurning,
        LandCoverClass::TropicalForest,
        LandCoverClass::Peat,
        LandCoverClass::ExtratropicalForest,
        LandCoverClass::BorealForest,
    ];

    /// Classes whose emission factors are read from the report
    pub const PRIMARY: [LandCoverClass; 6] = [
        LandCoverClass::Savannah,
        LandCoverClass::Agriculture,
        LandCoverClass::TropicalForest,
        LandCoverClass::Peat,
        LandCoverClass::ExtratropicalForest,
        LandCoverClass::BorealForest,
    ];

    /// Code of this class in the land-cover field
    pub fn grid_index(self) -> u8 {
        self as u8
    }

    /// Abbreviation used in output file names and diagnostics
    pub fn short_name(self) -> &'static str {
        match self {
            LandCoverClass::Savannah => "SA",
            LandCoverClass::SavannahOpenBurning => "SAOS",
            LandCoverClass::Agriculture => "AG",
            LandCoverClass::AgricultureOpenBurning => "AGOS",
            LandCoverClass::TropicalForest => "TF",
            LandCoverClass::Peat => "PEAT",
            LandCoverClass::ExtratropicalForest => "EF",
            LandCoverClass::BorealForest => "EFOS",
        }
    }

    /// Whether a land-cover field value denotes this class
    ///
    /// Values are compared against the integer code with an absolute tolerance.
    pub fn matches(self, value: FloatValue, tolerance: FloatValue) -> bool {
        (FloatValue::from(self.grid_index()) - value).abs() < tolerance
    }
}

impl fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Vegetation type as named in the emission-factor report
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LandCoverType {
    Peat,
    TropicalForest,
    TemperateForest,
    SavannahAndGrassland,
    BorealForest,
    AgriculturalResidue,
}

impl LandCoverType {
    pub const ALL: [LandCoverType; 6] = [
        LandCoverType::Peat,
        LandCoverType::TropicalForest,
        LandCoverType::TemperateForest,
        LandCoverType::SavannahAndGrassland,
        LandCoverType::BorealForest,
        LandCoverType::AgriculturalResidue,
    ];

    /// Name used in the report's `type` column
    pub fn report_name(self) -> &'static str {
        match self {
            LandCoverType::Peat => "peat",
            LandCoverType::TropicalForest => "tropical_forest",
            LandCoverType::TemperateForest => "temperate_forest",
            LandCoverType::SavannahAndGrassland => "savannah_and_grassland",
            LandCoverType::BorealForest => "boreal_forest",
            LandCoverType::AgriculturalResidue => "agricultural_residue",
        }
    }

    pub fn from_report_name(name: &str) -> Option<LandCoverType> {
        LandCoverType::ALL
            .into_iter()
            .find(|t| t.report_name() == name)
    }

    /// Land cover class this report type is assigned to
    ///
    /// Temperate forest maps to the extratropical forest class and boreal forest to
    /// its own class, so the six report types cover the six primary classes one-to-one.
    pub fn class(self) -> LandCoverClass {
        match self {
            LandCoverType::Peat => LandCoverClass::Peat,
            LandCoverType::TropicalForest => LandCoverClass::TropicalForest,
            LandCoverType::TemperateForest => LandCoverClass::ExtratropicalForest,
            LandCoverType::SavannahAndGrassland => LandCoverClass::Savannah,
            LandCoverType::BorealForest => LandCoverClass::BorealForest,
            LandCoverType::AgriculturalResidue => LandCoverClass::Agriculture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indices_are_one_based_and_ordered() {
        for (i, class) in LandCoverClass::ALL.iter().enumerate() {
            assert_eq!(class.grid_index() as usize, i + 1);
        }
    }

    #[test]
    fn test_report_types_cover_primary_classes() {
        let mut classes: Vec<_> = LandCoverType::ALL.iter().map(|t| t.class()).collect();
        classes.sort();
        let mut primary = LandCoverClass::PRIMARY.to_vec();
        primary.sort();
        assert_eq!(classes, primary);
    }

    #[test]
    fn test_report_type_lookup() {
        assert_eq!(
            LandCoverType::from_report_name("temperate_forest").map(LandCoverType::class),
            Some(LandCoverClass::ExtratropicalForest)
        );
        assert_eq!(
            LandCoverType::from_report_name("boreal_forest").map(LandCoverType::class),
            Some(LandCoverClass::BorealForest)
        );
        assert_eq!(LandCoverType::from_report_name("tundra"), None);
    }

    #[test]
    fn test_matches_within_tolerance() {
        let tf = LandCoverClass::TropicalForest;
        assert!(tf.matches(5.0, 0.1));
        assert!(tf.matches(5.05, 0.1));
        assert!(tf.matches(4.95, 0.1));
        assert!(!tf.matches(5.2, 0.1));
        assert!(!tf.matches(6.0, 0.1));
        assert!(!tf.matches(FloatValue::NAN, 0.1));
    }
}
