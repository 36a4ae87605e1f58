//! End-to-end runs through files on disk.

use approx::assert_relative_eq;
use gfas_core::emission_factors::FactorSet;
use gfas_core::errors::GfasError;
use gfas_core::grid::{AttributeValue, GridField, GridMetadata};
use gfas_core::parameters::EmissionParameters;
use gfas_core::pipeline::{self, Mode, RunConfig};
use gfas_core::species::Species;
use gfas_core::store::{GridStore, JsonLinesStore};
use ndarray::array;
use std::path::Path;

const REPORT: &str = "Species,A19_average,gfas_v1p2,perc_change,type\n\
                      CO,100,120,20,tropical_forest\n\
                      CO,50,50,0,peat\n\
                      NOx_as_NO,2,3,50,tropical_forest\n\
                      NOx_as_NO,1,1,0,peat\n";

fn write_inputs(dir: &Path, dry_matter_name: &str) -> RunConfig {
    let store = JsonLinesStore;
    let dm = GridField::new(
        GridMetadata::new(dry_matter_name, Some(210092))
            .with_attribute("dataDate", AttributeValue::Int(20240801)),
        array![[10.0, 20.0, 5.0]],
    );
    let lc = GridField::new(GridMetadata::new("dlc", Some(94)), array![[5.0, 6.0, 0.0]]);

    let dm_path = dir.join("fields.jsonl");
    let lc_path = dir.join("dlc.jsonl");
    let ef_path = dir.join("factors.csv");
    store.write_stream(&dm_path, &[dm]).unwrap();
    store.write_stream(&lc_path, &[lc]).unwrap();
    std::fs::write(&ef_path, REPORT).unwrap();

    let mut config = RunConfig::new(dm_path, lc_path, ef_path, "ratio and emission".parse().unwrap());
    config.output_dir = dir.join("out");
    config.species = vec![Species::CarbonMonoxide, Species::NitrogenOxides];
    config
}

#[test]
fn test_emission_and_ratio_streams() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), "crfire");
    let store = JsonLinesStore;

    let written = pipeline::run(&config, &EmissionParameters::default(), &store).unwrap();
    // eight ratio streams and two emission streams
    assert_eq!(written.len(), 10);
    assert!(written.iter().all(|w| w.records == 2));

    let reference = store
        .read(&config.output_dir.join("emissions_reference.jsonl"))
        .unwrap();
    assert_eq!(reference.len(), 2);
    assert_eq!(reference[0].short_name(), "cofire");
    assert_eq!(reference[1].short_name(), "noxfire");
    assert_eq!(
        reference[0].attribute("dataDate"),
        Some(AttributeValue::Int(20240801))
    );
    let co = reference[0].values();
    assert_relative_eq!(co[[0, 0]], 1.0, max_relative = 1e-12);
    assert_relative_eq!(co[[0, 1]], 1.0, max_relative = 1e-12);
    assert_eq!(co[[0, 2]], 0.0);

    let revised = store
        .read(&config.output_dir.join("emissions_revised.jsonl"))
        .unwrap();
    let nox = revised[1].values();
    assert_relative_eq!(nox[[0, 0]], 0.03, max_relative = 1e-12);
    assert_relative_eq!(nox[[0, 1]], 0.02, max_relative = 1e-12);

    let tf = store.read(&config.output_dir.join("ratio_TF.jsonl")).unwrap();
    assert_relative_eq!(tf[0].values()[[0, 0]], 1.2, max_relative = 1e-12);
    assert_eq!(tf[0].values()[[0, 1]], 1.0);
    assert_relative_eq!(tf[1].values()[[0, 0]], 1.5, max_relative = 1e-12);
}

#[test]
fn test_single_factor_set_emissions_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_inputs(dir.path(), "crfire");
    config.mode = Mode {
        ratios: false,
        emissions: true,
    };
    config.factor_sets = vec![FactorSet::Revised];

    let written = pipeline::run(&config, &EmissionParameters::default(), &JsonLinesStore).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].path.ends_with("emissions_revised.jsonl"));
    assert!(!config.output_dir.join("emissions_reference.jsonl").exists());
    assert!(!config.output_dir.join("ratio_TF.jsonl").exists());
}

#[test]
fn test_invalid_dry_matter_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_inputs(dir.path(), "frpfire");
    let dump = dir.path().join("emission_factors.json");
    config.dump_factors = Some(dump.clone());

    let result = pipeline::run(&config, &EmissionParameters::default(), &JsonLinesStore);
    assert!(matches!(result, Err(GfasError::InputValidation(_))));
    assert!(!config.output_dir.exists());
    assert!(!dump.exists());
}

#[test]
fn test_wrong_land_cover_param_id_writes_no_dump() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_inputs(dir.path(), "crfire");
    let lc = GridField::new(GridMetadata::new("dlc", Some(95)), array![[5.0, 6.0, 0.0]]);
    JsonLinesStore.write_stream(&config.land_cover, &[lc]).unwrap();
    let dump = dir.path().join("emission_factors.json");
    config.dump_factors = Some(dump.clone());

    let result = pipeline::run(&config, &EmissionParameters::default(), &JsonLinesStore);
    assert!(matches!(result, Err(GfasError::InputValidation(_))));
    assert!(!dump.exists());
}

#[test]
fn test_factor_dump() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_inputs(dir.path(), "crfire");
    let dump = dir.path().join("emission_factors.json");
    config.dump_factors = Some(dump.clone());

    pipeline::run(&config, &EmissionParameters::default(), &JsonLinesStore).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
    assert_relative_eq!(
        json["revised"]["nox"]["TF"].as_f64().unwrap(),
        0.003,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        json["reference"]["co"]["PEAT"].as_f64().unwrap(),
        0.05,
        max_relative = 1e-12
    );
}

#[test]
fn test_bad_report_header_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), "crfire");
    std::fs::write(&config.factors, "Species,gfas_v1p2,A19_average,perc_change,type\n").unwrap();

    let result = pipeline::run(&config, &EmissionParameters::default(), &JsonLinesStore);
    assert!(matches!(result, Err(GfasError::Schema { .. })));
}
