//! Emission-factor tables keyed by factor set, species and land cover class.
//!
//! Emission factors are read from a long-format report with one row per
//! (species, vegetation type) pair and one column per literature source:
//!
//! ```text
//! Species,A19_average,gfas_v1p2,perc_change,type
//! CO,100.0,120.0,20.0,tropical_forest
//! CO,50.0,50.0,0.0,peat
//! ```
//!
//! Each source column becomes a [`FactorSet`]. Reported values are divided by
//! [`EmissionParameters::unit_divisor`] and open-burning classes copy the factor of
//! their parent class.
//!
//! # Example
//!
//! ```
//! use gfas_core::emission_factors::{EmissionFactorTable, FactorSet};
//! use gfas_core::land_cover::LandCoverClass;
//! use gfas_core::parameters::EmissionParameters;
//! use gfas_core::species::Species;
//!
//! let csv = "Species,A19_average,gfas_v1p2,perc_change,type\n\
//!            CO,100.0,120.0,20.0,tropical_forest\n";
//! let table = EmissionFactorTable::from_reader(csv.as_bytes(), &EmissionParameters::default())
//!     .unwrap();
//! let factor = table
//!     .lookup(FactorSet::Revised, Species::CarbonMonoxide, LandCoverClass::TropicalForest)
//!     .unwrap();
//! assert!((factor - 0.12).abs() < 1e-12);
//! ```

use crate::errors::{GfasError, GfasResult};
use crate::land_cover::{LandCoverClass, LandCoverType};
use crate::parameters::EmissionParameters;
use crate::species::Species;
use crate::FloatValue;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Columns of the emission-factor report, in order
pub const EXPECTED_COLUMNS: [&str; 5] = ["Species", "A19_average", "gfas_v1p2", "perc_change", "type"];

/// One literature source of emission factors
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSet {
    /// Andreae (2019) compilation
    Reference,
    /// GFAS v1.2 factors
    Revised,
}

impl FactorSet {
    pub const ALL: [FactorSet; 2] = [FactorSet::Reference, FactorSet::Revised];

    /// Identifier used in output names and diagnostics
    pub fn id(self) -> &'static str {
        match self {
            FactorSet::Reference => "reference",
            FactorSet::Revised => "revised",
        }
    }

    /// Report column holding this set's factors
    pub fn column(self) -> &'static str {
        match self {
            FactorSet::Reference => EXPECTED_COLUMNS[1],
            FactorSet::Revised => EXPECTED_COLUMNS[2],
        }
    }
}

impl fmt::Display for FactorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FactorSet {
    type Err = GfasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactorSet::ALL
            .into_iter()
            .find(|set| set.id() == s)
            .ok_or_else(|| GfasError::Config(format!("Unknown factor set {:?}", s)))
    }
}

/// A single row of the emission-factor report
///
/// Empty factor cells are read as missing and stored as NaN in the table. The
/// `perc_change` column is only checked as part of the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorRow {
    #[serde(rename = "Species")]
    pub species: String,
    #[serde(rename = "A19_average")]
    pub factor_reference: Option<FloatValue>,
    #[serde(rename = "gfas_v1p2")]
    pub factor_revised: Option<FloatValue>,
    #[serde(rename = "type")]
    pub land_cover_type: String,
}

impl EmissionFactorRow {
    /// Reported (unscaled) factor for a factor set
    pub fn factor(&self, set: FactorSet) -> FloatValue {
        let value = match set {
            FactorSet::Reference => self.factor_reference,
            FactorSet::Revised => self.factor_revised,
        };
        value.unwrap_or(FloatValue::NAN)
    }
}

/// Check the report header against [`EXPECTED_COLUMNS`]
///
/// Names and order must match exactly.
pub fn validate_columns<S: AsRef<str>>(columns: &[S]) -> GfasResult<()> {
    let matches = columns.len() == EXPECTED_COLUMNS.len()
        && columns
            .iter()
            .zip(EXPECTED_COLUMNS.iter())
            .all(|(actual, expected)| actual.as_ref() == *expected);
    if matches {
        Ok(())
    } else {
        Err(GfasError::Schema {
            expected: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            actual: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }
}

/// Scaled emission factors for every (factor set, species, land cover class)
///
/// Immutable once built. Serialises as nested maps
/// `factor set -> species code -> land cover short name -> factor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmissionFactorTable {
    factors: BTreeMap<FactorSet, BTreeMap<Species, BTreeMap<LandCoverClass, FloatValue>>>,
}

impl EmissionFactorTable {
    /// Read and build a table from a CSV report
    pub fn from_reader<R: Read>(reader: R, params: &EmissionParameters) -> GfasResult<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(|c| c.to_string()).collect();
        debug!("emission-factor report columns: {:?}", columns);
        validate_columns(&columns)?;

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<EmissionFactorRow>, csv::Error>>()?;
        Self::build(&rows, params)
    }

    /// Read and build a table from a CSV file
    pub fn from_path(path: impl AsRef<Path>, params: &EmissionParameters) -> GfasResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| GfasError::io(path, e))?;
        let table = Self::from_reader(std::io::BufReader::new(file), params)?;
        info!(
            "read emission factors for {} species from {}",
            table.species().len(),
            path.display()
        );
        Ok(table)
    }

    /// Build a table from report rows whose header has already been validated
    ///
    /// Every (species, class) pair in the table's domain must be backed by exactly one
    /// row. The domain is the species and primary classes present in `rows`, or the whole
    /// vocabulary when [`EmissionParameters::require_full_domain`] is set.
    pub fn build(rows: &[EmissionFactorRow], params: &EmissionParameters) -> GfasResult<Self> {
        params.validate()?;

        let mut index: HashMap<(Species, LandCoverClass), Vec<&EmissionFactorRow>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 1;
            let class = LandCoverType::from_report_name(&row.land_cover_type)
                .ok_or_else(|| GfasError::UnknownLandCover {
                    name: row.land_cover_type.clone(),
                    row: row_number,
                })?
                .class();
            let species =
                Species::from_report_name(&row.species).ok_or_else(|| GfasError::UnknownSpecies {
                    name: row.species.clone(),
                    row: row_number,
                })?;
            index.entry((species, class)).or_default().push(row);
        }

        let (species_domain, class_domain): (BTreeSet<Species>, BTreeSet<LandCoverClass>) =
            if params.require_full_domain {
                (
                    Species::ALL.into_iter().collect(),
                    LandCoverClass::PRIMARY.into_iter().collect(),
                )
            } else {
                (
                    index.keys().map(|(s, _)| *s).collect(),
                    index.keys().map(|(_, c)| *c).collect(),
                )
            };

        let absent_classes: Vec<&str> = LandCoverClass::PRIMARY
            .into_iter()
            .filter(|c| !class_domain.contains(c))
            .map(LandCoverClass::short_name)
            .collect();
        if !absent_classes.is_empty() {
            warn!(
                "emission-factor report has no rows for land cover {}; cells of these classes will not emit",
                absent_classes.join(", ")
            );
        }
        let absent_species: Vec<&str> = Species::ALL
            .into_iter()
            .filter(|s| !species_domain.contains(s))
            .map(Species::code)
            .collect();
        if !absent_species.is_empty() {
            warn!(
                "emission-factor report has no rows for species {}",
                absent_species.join(", ")
            );
        }

        let mut factors = BTreeMap::new();
        for set in FactorSet::ALL {
            let mut by_species = BTreeMap::new();
            for &species in &species_domain {
                let mut by_class = BTreeMap::new();
                for &class in &class_domain {
                    let matching = index
                        .get(&(species, class))
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let [row] = matching else {
                        return Err(GfasError::Lookup {
                            species: species.report_name().to_string(),
                            land_cover: class.short_name().to_string(),
                            found: matching.len(),
                        });
                    };
                    by_class.insert(class, row.factor(set) / params.unit_divisor);
                }

                for rule in &params.open_burning {
                    if let Some(&factor) = by_class.get(&rule.parent) {
                        by_class.insert(rule.class, factor);
                    }
                }
                by_species.insert(species, by_class);
            }
            debug!(
                "populated {} factors for {} species from column {}",
                set,
                by_species.len(),
                set.column()
            );
            factors.insert(set, by_species);
        }

        Ok(Self { factors })
    }

    /// Scaled emission factor for a (factor set, species, land cover class)
    pub fn lookup(
        &self,
        set: FactorSet,
        species: Species,
        class: LandCoverClass,
    ) -> GfasResult<FloatValue> {
        self.factors
            .get(&set)
            .and_then(|by_species| by_species.get(&species))
            .and_then(|by_class| by_class.get(&class))
            .copied()
            .ok_or_else(|| GfasError::MissingFactor {
                factor_set: set.id().to_string(),
                species: species.code().to_string(),
                land_cover: class.short_name().to_string(),
            })
    }

    /// Ratio of the revised to the reference factor
    pub fn ratio(&self, species: Species, class: LandCoverClass) -> GfasResult<FloatValue> {
        Ok(self.lookup(FactorSet::Revised, species, class)?
            / self.lookup(FactorSet::Reference, species, class)?)
    }

    /// Factor sets held by the table
    pub fn factor_sets(&self) -> Vec<FactorSet> {
        self.factors.keys().copied().collect()
    }

    /// Species with factors, in vocabulary order
    pub fn species(&self) -> Vec<Species> {
        self.factors
            .values()
            .next()
            .map(|by_species| by_species.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether the table holds factors for `species`
    pub fn contains_species(&self, species: Species) -> bool {
        self.factors
            .values()
            .all(|by_species| by_species.contains_key(&species))
    }

    /// Land cover classes with factors for `species`, in grid-code order
    pub fn classes_for(&self, species: Species) -> Vec<LandCoverClass> {
        self.factors
            .values()
            .next()
            .and_then(|by_species| by_species.get(&species))
            .map(|by_class| by_class.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Land cover classes without factors for `species`, in grid-code order
    ///
    /// Cells of these classes contribute no emissions of `species`.
    pub fn missing_classes(&self, species: Species) -> Vec<LandCoverClass> {
        let present = self.classes_for(species);
        LandCoverClass::ALL
            .into_iter()
            .filter(|c| !present.contains(c))
            .collect()
    }

    /// Pretty-printed JSON dump of the whole table
    pub fn to_json(&self) -> GfasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON dump to `path`
    pub fn write_json(&self, path: impl AsRef<Path>) -> GfasResult<()> {
        let path = path.as_ref();
        info!("writing emission factors to {}", path.display());
        let json = format!("{}\n", self.to_json()?);
        std::fs::write(path, json).map_err(|e| GfasError::io(path, e))
    }
}
