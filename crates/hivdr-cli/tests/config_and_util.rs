//! Integration tests for CLI config parsing, data loading and util helpers.

use std::fs;

use hivdr_cli::load_data::{load_drug_datasets, read_consensus, read_fasta};
use hivdr_cli::predict::input::PredictConfig;
use hivdr_cli::train::input::TrainConfig;
use hivdr_cli::util::{delimiter_for, validate_tsv_or_csv_file};
use hivdr_ensemble::config::ModelType;
use hivdr_ensemble::registry::{DrugClass, DrugRegistry};
use hivdr_features::{ProteinFamily, Representation};

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/data.tsv").is_err());
}

#[test]
fn delimiter_follows_extension() {
    assert_eq!(delimiter_for("a.tsv"), b'\t');
    assert_eq!(delimiter_for("a.TSV"), b'\t');
    assert_eq!(delimiter_for("a.csv"), b',');
    assert_eq!(delimiter_for("a"), b',');
}

// ---------------------------------------------------------------------------
// Configs
// ---------------------------------------------------------------------------

#[test]
fn predict_config_defaults() {
    let cfg = PredictConfig::default();
    assert_eq!(cfg.drug_class, DrugClass::Protease);
    assert_eq!(cfg.interval_percentile, 95.0);
    assert_eq!(cfg.registry().unwrap().len(), 8);
    assert_eq!(cfg.feature_spec().protein, ProteinFamily::Protease);
    assert_eq!(cfg.feature_spec().n_features(), 99);
}

#[test]
fn predict_config_partial_json_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("predict.json");
    fs::write(
        &path,
        r#"{
            "model_dir": "/opt/models",
            "drug_class": "nrti",
            "representation": "pka",
            "interval_percentile": "not a number"
        }"#,
    )
    .unwrap();

    let cfg = PredictConfig::from_json(&path).unwrap();
    assert_eq!(cfg.model_dir, "/opt/models");
    assert_eq!(cfg.drug_class, DrugClass::Nrti);
    assert_eq!(cfg.representation, Representation::IsoelectricPoint);
    // invalid value keeps the default
    assert_eq!(cfg.interval_percentile, 95.0);
    assert_eq!(cfg.feature_spec().protein, ProteinFamily::ReverseTranscriptase);
    assert_eq!(cfg.registry().unwrap().drugs()[0], "3TC");
}

#[test]
fn predict_config_rejects_duplicate_drugs() {
    let cfg = PredictConfig {
        drugs: Some(vec!["FPV".to_string(), "fpv".to_string()]),
        ..PredictConfig::default()
    };
    assert!(cfg.registry().is_err());
}

#[test]
fn train_config_reads_model_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    fs::write(
        &path,
        r#"{
            "train_data": "data.csv",
            "test_size": 0.1,
            "model": {
                "RandomForest": {
                    "n_estimators": 10,
                    "max_depth": 5,
                    "min_leaf_size": 1,
                    "feature_sample_ratio": 1.0,
                    "bootstrap": false,
                    "training_optimization_level": 2,
                    "seed": 7
                }
            }
        }"#,
    )
    .unwrap();

    let cfg = TrainConfig::from_json(&path).unwrap();
    assert_eq!(cfg.train_data, "data.csv");
    assert_eq!(cfg.test_size, 0.1);
    assert_eq!(cfg.model.model_type.n_members(), 10);
    match cfg.model.model_type {
        ModelType::RandomForest { bootstrap, .. } => assert!(!bootstrap),
    }
}

#[test]
fn train_config_serializes_to_json() {
    let cfg = TrainConfig::default();
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    assert!(json.contains("train_data"));
    assert!(json.contains("RandomForest"));
    assert!(json.contains("\"representation\": \"mw\""));
}

// ---------------------------------------------------------------------------
// FASTA and training tables
// ---------------------------------------------------------------------------

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-12, "{} != {}", a, e);
    }
}

#[test]
fn fasta_records_are_concatenated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.fasta");
    fs::write(&path, ">a desc\nPQIT\nLWQR\n\n>b\nGAG\n").unwrap();

    let records = read_fasta(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "a");
    assert_eq!(records[0].sequence, "PQITLWQR");
    assert_eq!(records[1].sequence, "GAG");
    assert_eq!(read_consensus(&path).unwrap(), "PQITLWQR");
}

#[test]
fn fasta_without_header_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.fasta");
    fs::write(&path, "PQIT\n>a\nGAG\n").unwrap();
    assert!(read_fasta(&path).is_err());
}

#[test]
fn position_columns_with_consensus_and_bad_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pi.tsv");
    fs::write(
        &path,
        "SeqID\tFPV\tATV\tP1\tP2\tP3\tP4\n\
         1\t10\t100\t-\t-\tV\t-\n\
         2\t1\tNA\tP\tQ\tIV\tT\n\
         3\t0.1\t1\t-\t#\tI\tT\n\
         4\t1000\t10\tP\tQ\tI\t-\n",
    )
    .unwrap();

    let registry = DrugRegistry::new(&["FPV", "ATV"]).unwrap();
    let datasets = load_drug_datasets(
        &path,
        &registry,
        Representation::MolecularWeight,
        Some("PQIT"),
    )
    .unwrap();

    // rows 2 (mixture) and 3 (#) are unusable
    let fpv = &datasets[0];
    assert_eq!(fpv.drug, "FPV");
    assert_eq!(fpv.sequences, vec!["PQVT".to_string(), "PQIT".to_string()]);
    assert_close(&fpv.targets, &[1.0, 3.0]);

    let atv = &datasets[1];
    assert_close(&atv.targets, &[2.0, 1.0]);
}

#[test]
fn dashes_without_consensus_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pi.csv");
    fs::write(&path, "SeqID,FPV,P1,P2\n1,10,-,Q\n2,10,P,Q\n").unwrap();

    let registry = DrugRegistry::new(&["FPV"]).unwrap();
    let datasets =
        load_drug_datasets(&path, &registry, Representation::MolecularWeight, None).unwrap();
    assert_eq!(datasets[0].len(), 1);
    assert_eq!(datasets[0].sequences[0], "PQ");
}

#[test]
fn missing_drug_column_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pi.csv");
    fs::write(&path, "SeqID,FPV,sequence\n1,10,PQIT\n").unwrap();

    let registry = DrugRegistry::new(&["SQV"]).unwrap();
    assert!(load_drug_datasets(&path, &registry, Representation::MolecularWeight, None).is_err());
}
