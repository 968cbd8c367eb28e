//! Training datasets and the helpers that turn them into model inputs.
//!
//! A [`DrugDataset`] holds the raw sequences and log10 fold-change targets
//! for one drug. Featurization and train/test splitting operate on it before
//! the rows are handed to [`crate::models::fit_model`].
use hivdr_features::FeatureSpec;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::error::EnsembleError;

/// Labelled sequences for a single drug.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugDataset {
    pub drug: String,
    pub sequences: Vec<String>,
    /// log10 fold-change, aligned with `sequences`.
    pub targets: Vec<f64>,
}

impl DrugDataset {
    pub fn new(
        drug: impl Into<String>,
        sequences: Vec<String>,
        targets: Vec<f64>,
    ) -> Result<Self, EnsembleError> {
        let drug = drug.into();
        if sequences.len() != targets.len() {
            return Err(EnsembleError::Training(format!(
                "{}: {} sequences but {} targets",
                drug,
                sequences.len(),
                targets.len()
            )));
        }
        Ok(DrugDataset {
            drug,
            sequences,
            targets,
        })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn targets_f32(&self) -> Vec<f32> {
        self.targets.iter().map(|&t| t as f32).collect()
    }

    pub fn log_summary(&self) {
        log::info!(
            "{}: {} labelled sequences, target range [{:.3}, {:.3}]",
            self.drug,
            self.len(),
            self.targets.iter().cloned().fold(f64::INFINITY, f64::min),
            self.targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        );
    }
}

/// Featurize every sequence into one row of an `(n, T)` matrix.
///
/// Rows are computed in parallel and keep input order. The first sequence
/// that fails to featurize aborts the whole matrix.
pub fn build_feature_matrix(
    sequences: &[String],
    spec: &FeatureSpec,
) -> Result<Array2<f32>, EnsembleError> {
    let n_features = spec.n_features();
    let rows = sequences
        .par_iter()
        .map(|seq| spec.featurize(seq).map(|v| v.to_f32_vec()))
        .collect::<Result<Vec<Vec<f32>>, _>>()?;

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((sequences.len(), n_features), flat)
        .map_err(|e| EnsembleError::Training(format!("feature matrix shape: {}", e)))
}

/// Row indices for a seeded train/test split.
///
/// `test_size` is the held-out fraction. With `test_size == 0` every row is
/// used for training and the test set is empty.
pub fn train_test_split(
    n_samples: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), EnsembleError> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(EnsembleError::Training(format!(
            "test_size must be in [0, 1), got {}",
            test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = (n_samples as f64 * test_size).round() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    Ok((train, test))
}

pub fn select_rows(x: &Array2<f32>, indices: &[usize]) -> Array2<f32> {
    x.select(Axis(0), indices)
}

pub fn select_targets(y: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| y[i]).collect()
}
