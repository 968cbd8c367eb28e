//! Integration tests for forest training and model persistence.

use hivdr_ensemble::config::{ModelConfig, ModelType};
use hivdr_ensemble::models::{fit_model, EnsembleModel};
use hivdr_ensemble::store::{FileModelStore, ModelArtifact, ModelCache, ModelStore};
use hivdr_ensemble::registry::DrugRegistry;
use hivdr_ensemble::EnsembleError;
use hivdr_features::{FeatureSpec, ProteinFamily, Representation};
use ndarray::Array2;

fn small_forest(n_estimators: usize, bootstrap: bool) -> ModelConfig {
    ModelConfig::new(ModelType::RandomForest {
        n_estimators,
        max_depth: 4,
        min_leaf_size: 1,
        feature_sample_ratio: 1.0,
        bootstrap,
        training_optimization_level: 2,
        seed: 11,
    })
}

fn step_data() -> (Array2<f32>, Vec<f32>) {
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            0.0, 1.0, //
            0.1, 1.0, //
            0.2, 1.0, //
            0.8, 0.0, //
            0.9, 0.0, //
            1.0, 0.0,
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![0.5, 0.5, 0.5, 1.5, 1.5, 1.5];
    (x, y)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn factory_builds_and_predicts() {
    init_logging();
    let (x, y) = step_data();
    let model = fit_model(&small_forest(5, true), &x, &y).unwrap();
    assert_eq!(model.n_members(), 5);
    assert_eq!(model.n_features(), 2);
    assert_eq!(model.name(), "random_forest");

    let p = model.predict(&[0.05, 1.0]).unwrap();
    assert!((0.5..=1.5).contains(&p), "prediction {} outside target range", p);
}

#[test]
fn same_seed_gives_same_forest() {
    let (x, y) = step_data();
    let a = fit_model(&small_forest(4, true), &x, &y).unwrap();
    let b = fit_model(&small_forest(4, true), &x, &y).unwrap();
    let row = [0.85, 0.0];
    let pa: Vec<f64> = a.members().iter().map(|m| m.predict(&row).unwrap()).collect();
    let pb: Vec<f64> = b.members().iter().map(|m| m.predict(&row).unwrap()).collect();
    assert_eq!(pa, pb);
}

#[test]
fn artifact_round_trip_through_file_store() {
    init_logging();
    let (x, y) = step_data();
    let model = fit_model(&small_forest(3, false), &x, &y).unwrap();
    let before = model.predict(&[0.9, 0.0]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let spec = FeatureSpec::default();
    let store = FileModelStore::new(dir.path(), spec);
    let path = store
        .save(&ModelArtifact::new("FPV", spec, x.nrows(), model))
        .unwrap();
    assert_eq!(path, dir.path().join("FPV").join("FPV.json"));
    assert!(path.is_file());

    let loaded = store.load("FPV").unwrap();
    assert_eq!(loaded.n_members(), 3);
    let after = loaded.predict(&[0.9, 0.0]).unwrap();
    assert!((before - after).abs() < 1e-6);
}

#[test]
fn missing_artifact_is_model_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileModelStore::new(dir.path(), FeatureSpec::default());
    let err = store.load("ATV").err().unwrap();
    assert!(matches!(err, EnsembleError::ModelNotFound(ref d) if d == "ATV"));
}

#[test]
fn artifact_with_other_features_is_refused() {
    let (x, y) = step_data();
    let model = fit_model(&small_forest(2, false), &x, &y).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let trained_with = FeatureSpec::new(Representation::IsoelectricPoint, ProteinFamily::Protease);
    FileModelStore::new(dir.path(), trained_with)
        .save(&ModelArtifact::new("LPV", trained_with, x.nrows(), model))
        .unwrap();

    let store = FileModelStore::new(dir.path(), FeatureSpec::default());
    let err = store.load("LPV").err().unwrap();
    assert!(matches!(err, EnsembleError::IncompatibleArtifact { .. }));
}

#[test]
fn cache_preload_fails_without_partial_result() {
    let (x, y) = step_data();
    let model = fit_model(&small_forest(2, false), &x, &y).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let spec = FeatureSpec::default();
    let store = FileModelStore::new(dir.path(), spec);
    store
        .save(&ModelArtifact::new("FPV", spec, x.nrows(), model))
        .unwrap();

    let ok = ModelCache::preload(&store, &DrugRegistry::new(&["FPV"]).unwrap()).unwrap();
    assert!(ok.contains("FPV"));

    let registry = DrugRegistry::new(&["FPV", "SQV"]).unwrap();
    assert!(matches!(
        ModelCache::preload(&store, &registry),
        Err(EnsembleError::ModelNotFound(_))
    ));
}
