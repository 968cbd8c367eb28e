use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hivdr_ensemble::data_handling::{
    build_feature_matrix, select_rows, select_targets, train_test_split, DrugDataset,
};
use hivdr_ensemble::models::{fit_model, EnsembleModel, TrainedModel};
use hivdr_ensemble::stats::RegressionMetrics;
use hivdr_ensemble::store::{FileModelStore, ModelArtifact};
use hivdr_features::FeatureSpec;
use ndarray::Array2;
use serde::Serialize;

use crate::load_data::{load_drug_datasets, read_consensus};
use crate::train::input::TrainConfig;
use crate::util::write_json;

/// Fewest labelled rows a drug needs before a model is fitted.
const MIN_TRAINING_SAMPLES: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct DrugTrainingReport {
    pub drug: String,
    pub n_samples: usize,
    /// Held-out metrics; absent when evaluation was skipped.
    pub metrics: Option<RegressionMetrics>,
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub version: String,
    pub features: FeatureSpec,
    pub test_size: f64,
    pub drugs: Vec<DrugTrainingReport>,
    pub skipped: Vec<String>,
}

fn predict_rows(model: &TrainedModel, x: &Array2<f32>) -> Result<Vec<f64>> {
    x.rows()
        .into_iter()
        .map(|row| {
            let features: Vec<f64> = row.iter().map(|&v| v as f64).collect();
            Ok(model.predict(&features)?)
        })
        .collect()
}

/// Fit on a seeded training split and score on the rest.
///
/// Returns `None` when the split leaves fewer than two rows on either side.
fn evaluate(
    dataset: &DrugDataset,
    x: &Array2<f32>,
    config: &TrainConfig,
) -> Result<Option<RegressionMetrics>> {
    if config.test_size <= 0.0 {
        return Ok(None);
    }

    let (train_idx, test_idx) = train_test_split(dataset.len(), config.test_size, config.seed)?;
    if train_idx.len() < MIN_TRAINING_SAMPLES || test_idx.len() < 2 {
        log::warn!(
            "{}: too few rows for a {} held-out split, skipping evaluation",
            dataset.drug,
            config.test_size
        );
        return Ok(None);
    }

    let y_train: Vec<f32> = select_targets(&dataset.targets, &train_idx)
        .iter()
        .map(|&t| t as f32)
        .collect();
    let model = fit_model(&config.model, &select_rows(x, &train_idx), &y_train)?;

    let y_test = select_targets(&dataset.targets, &test_idx);
    let y_pred = predict_rows(&model, &select_rows(x, &test_idx))?;
    let metrics = RegressionMetrics::compute(&y_test, &y_pred)?;

    log::info!(
        "{}: held-out n={} rmse={:.4} mae={:.4} r2={:.4} pearson_r={:.4}",
        dataset.drug,
        metrics.n_samples,
        metrics.rmse,
        metrics.mae,
        metrics.r2,
        metrics.pearson_r
    );
    Ok(Some(metrics))
}

fn train_drug(
    dataset: &DrugDataset,
    features: &FeatureSpec,
    store: &FileModelStore,
    config: &TrainConfig,
) -> Result<DrugTrainingReport> {
    dataset.log_summary();
    let x = build_feature_matrix(&dataset.sequences, features)
        .with_context(|| format!("Failed to featurize sequences for {}", dataset.drug))?;

    let metrics = evaluate(dataset, &x, config)?;

    log::info!(
        "{}: fitting {} on all {} rows",
        dataset.drug,
        config.model.model_type.name(),
        dataset.len()
    );
    let model = fit_model(&config.model, &x, &dataset.targets_f32())
        .with_context(|| format!("Training failed for {}", dataset.drug))?;

    let artifact = ModelArtifact::new(dataset.drug.clone(), *features, dataset.len(), model);
    let path = store.save(&artifact)?;

    Ok(DrugTrainingReport {
        drug: dataset.drug.clone(),
        n_samples: dataset.len(),
        metrics,
        artifact: path.to_string_lossy().into_owned(),
    })
}

pub fn run_training(config: &TrainConfig) -> Result<()> {
    let registry = config.registry()?;
    let features = config.feature_spec();

    let consensus = match &config.consensus_fasta {
        Some(path) => Some(read_consensus(path)?),
        None => None,
    };

    let datasets = load_drug_datasets(
        &config.train_data,
        &registry,
        features.representation,
        consensus.as_deref(),
    )?;

    let start_time = std::time::Instant::now();
    let store = FileModelStore::new(&config.model_dir, features);
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for dataset in &datasets {
        if dataset.len() < MIN_TRAINING_SAMPLES {
            log::warn!(
                "{}: only {} labelled rows, no model trained",
                dataset.drug,
                dataset.len()
            );
            skipped.push(dataset.drug.clone());
            continue;
        }
        reports.push(train_drug(dataset, &features, &store, config)?);
    }

    if reports.is_empty() {
        anyhow::bail!("No drug had enough labelled rows to train a model");
    }

    let report = TrainingReport {
        version: clap::crate_version!().to_string(),
        features,
        test_size: config.test_size,
        drugs: reports,
        skipped,
    };

    let model_dir = Path::new(&config.model_dir);
    write_json(&report, model_dir.join("training_report.json"))?;
    write_json(config, model_dir.join("train_config.json"))?;

    log::info!(
        "[HIVDR::Train] Trained {} models in {:?}, written to {}",
        report.drugs.len(),
        start_time.elapsed(),
        PathBuf::from(&config.model_dir).display()
    );
    Ok(())
}
