//! Emission Parameters
//!
//! Conventions shared by the emission-factor table and the field compositor: the
//! unit scaling applied to reported factors, how land-cover codes are matched, which
//! classes borrow their factor from a parent, and the identifiers expected on input
//! fields.
//!
//! # Reference
//!
//! Defaults follow the GFAS v1.2 land-cover scheme and the Andreae (2019) emission
//! factor compilation, whose factors are reported in g species per kg dry matter.

use crate::errors::{GfasError, GfasResult};
use crate::land_cover::LandCoverClass;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A land cover class that has no factors of its own and copies its parent's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBurningRule {
    /// Class receiving the copied factor
    pub class: LandCoverClass,
    /// Primary class whose factor is copied
    pub parent: LandCoverClass,
}

/// Parameters for building emission-factor tables and emission fields
///
/// # Emission flux
///
/// For species $s$, factor set $v$ and cell $i$:
///
/// $$E_{s,v}(i) = \sum_{c} DM(i) \cdot \frac{EF_{v,s,c}}{d} \cdot [\,|c - LC(i)| < \epsilon\,]$$
///
/// where $d$ is [`unit_divisor`](Self::unit_divisor) and $\epsilon$ is
/// [`match_tolerance`](Self::match_tolerance).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionParameters {
    /// Divisor applied to every reported emission factor
    /// Converts g/kg as reported into kg/kg
    /// unit: dimensionless
    /// default: 1000.0
    pub unit_divisor: FloatValue,

    /// Absolute tolerance when matching a land-cover value to a class code
    /// Must be below 0.5 so that no value can match two classes
    /// unit: dimensionless
    /// default: 0.1
    pub match_tolerance: FloatValue,

    /// Classes that copy the factor of a primary class
    /// default: SAOS from SA, AGOS from AG
    pub open_burning: Vec<OpenBurningRule>,

    /// Short name required on the dry matter (combustion rate) field
    /// default: "crfire"
    pub dry_matter_short_name: String,

    /// Parameter identifier required on the dominant land cover field
    /// default: 94
    pub land_cover_param_id: i64,

    /// Suffix appended to a species code to name its output field
    /// default: "fire"
    pub process_tag: String,

    /// Require factors for every species of the vocabulary and every primary class
    /// When false, the table covers the species and classes present in the report
    /// default: false
    pub require_full_domain: bool,
}

impl Default for EmissionParameters {
    fn default() -> Self {
        Self {
            unit_divisor: 1000.0,
            match_tolerance: 0.1,
            open_burning: vec![
                OpenBurningRule {
                    class: LandCoverClass::SavannahOpenBurning,
                    parent: LandCoverClass::Savannah,
                },
                OpenBurningRule {
                    class: LandCoverClass::AgricultureOpenBurning,
                    parent: LandCoverClass::Agriculture,
                },
            ],
            dry_matter_short_name: "crfire".to_string(),
            land_cover_param_id: 94,
            process_tag: "fire".to_string(),
            require_full_domain: false,
        }
    }
}

impl EmissionParameters {
    /// Parse parameters from TOML, using defaults for any missing field
    pub fn from_toml_str(text: &str) -> GfasResult<Self> {
        let params: Self = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> GfasResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GfasError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Short name of the output field for a species code
    pub fn output_short_name(&self, species_code: &str) -> String {
        format!("{}{}", species_code, self.process_tag)
    }

    /// Parent class whose factor `class` copies, if it is an open-burning class
    pub fn parent_of(&self, class: LandCoverClass) -> Option<LandCoverClass> {
        self.open_burning
            .iter()
            .find(|rule| rule.class == class)
            .map(|rule| rule.parent)
    }

    /// Check that the parameters describe a usable configuration
    ///
    /// Every non-primary class must have exactly one open-burning rule pointing at a
    /// primary class.
    pub fn validate(&self) -> GfasResult<()> {
        if !self.unit_divisor.is_finite() || self.unit_divisor == 0.0 {
            return Err(invalid(
                "unit_divisor",
                format!("must be finite and non-zero, got {}", self.unit_divisor),
            ));
        }
        if !(self.match_tolerance > 0.0 && self.match_tolerance < 0.5) {
            return Err(invalid(
                "match_tolerance",
                format!("must lie in (0, 0.5), got {}", self.match_tolerance),
            ));
        }

        for rule in &self.open_burning {
            if LandCoverClass::PRIMARY.contains(&rule.class) {
                return Err(invalid(
                    "open_burning",
                    format!("{} has its own factors and cannot copy {}", rule.class, rule.parent),
                ));
            }
            if !LandCoverClass::PRIMARY.contains(&rule.parent) {
                return Err(invalid(
                    "open_burning",
                    format!("{} must copy a primary class, not {}", rule.class, rule.parent),
                ));
            }
        }
        for class in LandCoverClass::ALL {
            if LandCoverClass::PRIMARY.contains(&class) {
                continue;
            }
            let count = self.open_burning.iter().filter(|r| r.class == class).count();
            if count != 1 {
                return Err(invalid(
                    "open_burning",
                    format!("{} needs exactly one rule, found {}", class, count),
                ));
            }
        }

        if self.dry_matter_short_name.is_empty() {
            return Err(invalid("dry_matter_short_name", "must not be empty".to_string()));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: String) -> GfasError {
    GfasError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = EmissionParameters::default();
        assert!((params.unit_divisor - 1000.0).abs() < 1e-10);
        assert!((params.match_tolerance - 0.1).abs() < 1e-10);
        assert_eq!(params.dry_matter_short_name, "crfire");
        assert_eq!(params.land_cover_param_id, 94);
        assert!(!params.require_full_domain);
        params.validate().unwrap();
    }

    #[test]
    fn test_open_burning_parents() {
        let params = EmissionParameters::default();
        assert_eq!(
            params.parent_of(LandCoverClass::SavannahOpenBurning),
            Some(LandCoverClass::Savannah)
        );
        assert_eq!(
            params.parent_of(LandCoverClass::AgricultureOpenBurning),
            Some(LandCoverClass::Agriculture)
        );
        assert_eq!(params.parent_of(LandCoverClass::Peat), None);
    }

    #[test]
    fn test_output_short_name() {
        let params = EmissionParameters::default();
        assert_eq!(params.output_short_name("co"), "cofire");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
unit_divisor = 1.0
process_tag = "bb"
"#;
        let params = EmissionParameters::from_toml_str(toml).expect("Partial deserialization failed");

        assert!((params.unit_divisor - 1.0).abs() < 1e-10);
        assert_eq!(params.process_tag, "bb");

        // Other fields should be defaults
        assert!((params.match_tolerance - 0.1).abs() < 1e-10);
        assert_eq!(params.open_burning.len(), 2);
    }

    #[test]
    fn test_open_burning_rules_from_toml() {
        let toml = r#"
[[open_burning]]
class = "SAOS"
parent = "SA"

[[open_burning]]
class = "AGOS"
parent = "TF"
"#;
        let params = EmissionParameters::from_toml_str(toml).unwrap();
        assert_eq!(
            params.parent_of(LandCoverClass::AgricultureOpenBurning),
            Some(LandCoverClass::TropicalForest)
        );
    }

    #[test]
    fn test_tolerance_must_keep_classes_exclusive() {
        let result = EmissionParameters::from_toml_str("match_tolerance = 0.5");
        assert!(matches!(
            result,
            Err(GfasError::InvalidParameter { ref name, .. }) if name == "match_tolerance"
        ));
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let params = EmissionParameters {
            unit_divisor: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_missing_open_burning_rule_rejected() {
        let mut params = EmissionParameters::default();
        params.open_burning.pop();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rule_for_primary_class_rejected() {
        let mut params = EmissionParameters::default();
        params.open_burning.push(OpenBurningRule {
            class: LandCoverClass::Peat,
            parent: LandCoverClass::TropicalForest,
        });
        assert!(params.validate().is_err());
    }
}
