//! End-to-end emission run: read inputs, composite, write output streams
//!
//! All output fields are computed before the first output stream is opened, so a
//! validation or lookup failure leaves no partially written stream behind.

use crate::compositor::FieldCompositor;
use crate::emission_factors::{EmissionFactorTable, FactorSet};
use crate::errors::{GfasError, GfasResult};
use crate::grid::GridField;
use crate::land_cover::LandCoverClass;
use crate::parameters::EmissionParameters;
use crate::species::Species;
use crate::store::GridStore;
use log::info;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which products a run computes
///
/// Parsed from free text: any text containing `ratio` enables ratio fields and any text
/// containing `emission` enables emission fluxes (case-insensitive).
///
/// ```
/// use gfas_core::pipeline::Mode;
///
/// let mode: Mode = "ratios+emissions".parse().unwrap();
/// assert!(mode.ratios && mode.emissions);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub ratios: bool,
    pub emissions: bool,
}

impl FromStr for Mode {
    type Err = GfasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.to_lowercase();
        let mode = Mode {
            ratios: text.contains("ratio"),
            emissions: text.contains("emission"),
        };
        if !mode.ratios && !mode.emissions {
            return Err(GfasError::Config(format!(
                "Mode {:?} selects neither \"ratio\" nor \"emission\"",
                s
            )));
        }
        Ok(mode)
    }
}

/// Inputs and options for a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Stream holding the dry matter burnt field as its first record
    pub dry_matter: PathBuf,
    /// Stream holding the dominant land cover field as its first record
    pub land_cover: PathBuf,
    /// Emission-factor report (CSV)
    pub factors: PathBuf,
    pub mode: Mode,
    /// Directory receiving the output streams
    pub output_dir: PathBuf,
    /// Species to compute, in output record order
    pub species: Vec<Species>,
    /// Factor sets for emission fluxes, in output stream order
    pub factor_sets: Vec<FactorSet>,
    /// Optional destination for a JSON dump of the emission-factor table
    pub dump_factors: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(
        dry_matter: impl Into<PathBuf>,
        land_cover: impl Into<PathBuf>,
        factors: impl Into<PathBuf>,
        mode: Mode,
    ) -> Self {
        Self {
            dry_matter: dry_matter.into(),
            land_cover: land_cover.into(),
            factors: factors.into(),
            mode,
            output_dir: PathBuf::from("."),
            species: vec![
                Species::NitrogenOxides,
                Species::CarbonMonoxide,
                Species::Ammonia,
            ],
            factor_sets: FactorSet::ALL.to_vec(),
            dump_factors: None,
        }
    }
}

/// Output stream written by a run
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenStream {
    pub path: PathBuf,
    pub records: usize,
}

/// Path of the emission stream for a factor set
pub fn emission_stream_path(dir: &Path, factor_set: FactorSet, extension: &str) -> PathBuf {
    dir.join(format!("emissions_{}.{}", factor_set, extension))
}

/// Path of the ratio stream for a land cover class
pub fn ratio_stream_path(dir: &Path, class: LandCoverClass, extension: &str) -> PathBuf {
    dir.join(format!("ratio_{}.{}", class.short_name(), extension))
}

/// Run the emission calculation described by `config`
pub fn run<S: GridStore>(
    config: &RunConfig,
    params: &EmissionParameters,
    store: &S,
) -> GfasResult<Vec<WrittenStream>> {
    params.validate()?;
    if config.species.is_empty() {
        return Err(GfasError::Config("No species requested".to_string()));
    }
    if config.mode.emissions && config.factor_sets.is_empty() {
        return Err(GfasError::Config("No factor sets requested".to_string()));
    }

    let dry_matter = store.read_first(&config.dry_matter)?;
    info!(
        "dry matter: {} (paramId {:?}) {}",
        dry_matter.short_name(),
        dry_matter.param_id(),
        dry_matter.metadata().name
    );
    let land_cover = store.read_first(&config.land_cover)?;
    info!(
        "land cover: {} (paramId {:?}) {}",
        land_cover.short_name(),
        land_cover.param_id(),
        land_cover.metadata().name
    );

    let table = EmissionFactorTable::from_path(&config.factors, params)?;
    let compositor = FieldCompositor::new(&table, params);
    compositor.validate_inputs(&dry_matter, &land_cover)?;
    if let Some(path) = &config.dump_factors {
        table.write_json(path)?;
    }

    let mut streams: Vec<(PathBuf, Vec<GridField>)> = Vec::new();
    if config.mode.ratios {
        for ratio in compositor.compute_ratios(&land_cover, &config.species)? {
            let path = ratio_stream_path(&config.output_dir, ratio.class, store.extension());
            streams.push((path, ratio.fields));
        }
    }
    if config.mode.emissions {
        for emission in compositor.compute_emissions(
            &dry_matter,
            &land_cover,
            &config.species,
            &config.factor_sets,
        )? {
            let path =
                emission_stream_path(&config.output_dir, emission.factor_set, store.extension());
            streams.push((path, emission.fields));
        }
    }

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| GfasError::io(&config.output_dir, e))?;
    let mut written = Vec::with_capacity(streams.len());
    for (path, fields) in streams {
        let records = store.write_stream(&path, &fields)?;
        info!("wrote {} fields to {}", records, path.display());
        written.push(WrittenStream { path, records });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_text() {
        assert_eq!(
            "ratio".parse::<Mode>().unwrap(),
            Mode {
                ratios: true,
                emissions: false
            }
        );
        assert_eq!(
            "Emissions".parse::<Mode>().unwrap(),
            Mode {
                ratios: false,
                emissions: true
            }
        );
        assert!("emission_ratio".parse::<Mode>().unwrap().ratios);
        assert!(matches!("both".parse::<Mode>(), Err(GfasError::Config(_))));
    }

    #[test]
    fn test_default_run_config() {
        let config = RunConfig::new("dm.jsonl", "lc.jsonl", "ef.csv", "emission".parse().unwrap());
        assert_eq!(config.species.len(), 3);
        assert_eq!(config.species[0], Species::NitrogenOxides);
        assert_eq!(config.factor_sets, FactorSet::ALL.to_vec());
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_stream_paths() {
        let dir = Path::new("out");
        assert_eq!(
            emission_stream_path(dir, FactorSet::Revised, "jsonl"),
            PathBuf::from("out/emissions_revised.jsonl")
        );
        assert_eq!(
            ratio_stream_path(dir, LandCoverClass::Peat, "jsonl"),
            PathBuf::from("out/ratio_PEAT.jsonl")
        );
    }
}
