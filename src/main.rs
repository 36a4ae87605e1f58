//! GFAS emissions
//!
//! Computes biomass-burning emission fluxes (and emission-factor ratio fields) from a
//! dry matter burnt field, a dominant land cover field and an emission-factor report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- \
//!   --dry-matter fields.jsonl \
//!   --land-cover dat/dlc.jsonl \
//!   --factors dat/Table2_GFAS_vs_A19_EF_summary_longformat.csv \
//!   --mode ratio+emission \
//!   --output-dir out/
//! ```

use clap::Parser;
use gfas_core::emission_factors::FactorSet;
use gfas_core::parameters::EmissionParameters;
use gfas_core::pipeline::{self, Mode, RunConfig};
use gfas_core::species::Species;
use gfas_core::store::JsonLinesStore;
use log::{error, LevelFilter};
use std::path::PathBuf;

/// Biomass-burning emission fields from dry matter burnt and land cover
#[derive(Parser, Debug)]
#[command(name = "gfas-emissions")]
#[command(about = "Compute species emission fluxes and emission-factor ratios per land cover class")]
struct Args {
    /// Stream holding the dry matter burnt (combustion rate) field
    #[arg(long)]
    dry_matter: PathBuf,

    /// Stream holding the dominant land cover field
    #[arg(long)]
    land_cover: PathBuf,

    /// Emission-factor report (CSV)
    #[arg(long)]
    factors: PathBuf,

    /// Products to compute: any text containing "ratio" and/or "emission"
    #[arg(short, long)]
    mode: Mode,

    /// Output directory for the record streams
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Comma-separated species codes, in output order
    #[arg(short, long, value_delimiter = ',', default_value = "nox,co,nh3")]
    species: Vec<Species>,

    /// Comma-separated factor sets for emission fluxes
    #[arg(long, value_delimiter = ',', default_value = "reference,revised")]
    factor_sets: Vec<FactorSet>,

    /// Write the emission-factor table as JSON to this path
    #[arg(long)]
    dump_factors: Option<PathBuf>,

    /// TOML file overriding emission parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log per-species progress
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(
            &self.dry_matter,
            &self.land_cover,
            &self.factors,
            self.mode,
        );
        config.output_dir = self.output_dir.clone();
        config.species = self.species.clone();
        config.factor_sets = self.factor_sets.clone();
        config.dump_factors = self.dump_factors.clone();
        config
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let params = match &args.config {
        Some(path) => EmissionParameters::from_path(path),
        None => Ok(EmissionParameters::default()),
    };
    let result = params.and_then(|params| pipeline::run(&args.run_config(), &params, &JsonLinesStore));

    match result {
        Ok(streams) => {
            println!("Wrote {} output streams", streams.len());
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from([
            "gfas-emissions",
            "--dry-matter",
            "dm.jsonl",
            "--land-cover",
            "lc.jsonl",
            "--factors",
            "ef.csv",
            "--mode",
            "emission",
        ]);
        assert_eq!(
            args.species,
            vec![Species::NitrogenOxides, Species::CarbonMonoxide, Species::Ammonia]
        );
        assert_eq!(args.factor_sets, FactorSet::ALL.to_vec());

        let config = args.run_config();
        assert!(config.mode.emissions);
        assert!(!config.mode.ratios);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_species_list() {
        let args = Args::parse_from([
            "gfas-emissions",
            "--dry-matter",
            "dm.jsonl",
            "--land-cover",
            "lc.jsonl",
            "--factors",
            "ef.csv",
            "--mode",
            "ratio",
            "--species",
            "co2,ch4",
            "--factor-sets",
            "revised",
        ]);
        assert_eq!(args.species, vec![Species::CarbonDioxide, Species::Methane]);
        assert_eq!(args.factor_sets, vec![FactorSet::Revised]);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Args::try_parse_from([
            "gfas-emissions",
            "--dry-matter",
            "dm.jsonl",
            "--land-cover",
            "lc.jsonl",
            "--factors",
            "ef.csv",
            "--mode",
            "nothing",
        ]);
        assert!(result.is_err());
    }
}
