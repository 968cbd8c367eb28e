use std::fmt;

use gbdt::config::Loss;
use gbdt::decision_tree::{Data, DataVec, DecisionTree, TrainingCache, ValueType};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::EnsembleError;
use crate::models::ensemble_trait::{EnsembleModel, MemberEstimator};

/// A single squared-error regression tree.
#[derive(Serialize, Deserialize)]
pub struct RegressionTree {
    tree: DecisionTree,
}

impl fmt::Debug for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegressionTree").finish_non_exhaustive()
    }
}

impl MemberEstimator for RegressionTree {
    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError> {
        let row: Vec<ValueType> = features.iter().map(|&v| v as ValueType).collect();
        let test_x: DataVec = vec![Data::new_training_data(row, 1.0, 0.0, None)];
        let predictions = self.tree.predict(&test_x);
        predictions
            .first()
            .map(|&p| p as f64)
            .ok_or_else(|| EnsembleError::MemberPrediction {
                index: 0,
                message: "tree returned no prediction".to_string(),
            })
    }
}

/// Random forest regressor: bagged regression trees averaged together.
///
/// Each tree is an ensemble member whose prediction can be queried on its
/// own, which is what the uncertainty range is built from.
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Fit a forest on `x` (rows are samples) and targets `y`.
    ///
    /// Trees are grown in parallel. Member `i` draws its bootstrap sample from
    /// an RNG seeded with `seed + i`, so a given config and dataset always
    /// yields the same row samples.
    pub fn fit(x: &Array2<f32>, y: &[f32], config: &ModelConfig) -> Result<Self, EnsembleError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(EnsembleError::Training(
                "feature matrix must be non-empty".to_string(),
            ));
        }
        if y.len() != n_samples {
            return Err(EnsembleError::Training(format!(
                "feature matrix has {} rows but {} targets were given",
                n_samples,
                y.len()
            )));
        }

        match &config.model_type {
            ModelType::RandomForest {
                n_estimators,
                max_depth,
                min_leaf_size,
                feature_sample_ratio,
                bootstrap,
                training_optimization_level,
                seed,
            } => {
                if *n_estimators == 0 {
                    return Err(EnsembleError::Training(
                        "n_estimators must be at least 1".to_string(),
                    ));
                }

                log::debug!(
                    "Fitting random forest: {} trees, {} samples, {} features",
                    n_estimators,
                    n_samples,
                    n_features
                );

                let trees: Vec<RegressionTree> = (0..*n_estimators)
                    .into_par_iter()
                    .map(|i| {
                        let rows: Vec<usize> = if *bootstrap {
                            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                            (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                        } else {
                            (0..n_samples).collect()
                        };

                        let train_x: DataVec = rows
                            .iter()
                            .map(|&r| {
                                let train_row = x.row(r).to_vec();
                                Data::new_training_data(train_row, 1.0, y[r] as ValueType, None)
                            })
                            .collect();

                        let mut tree = DecisionTree::new();
                        tree.set_feature_size(n_features);
                        tree.set_max_depth(*max_depth);
                        tree.set_min_leaf_size(*min_leaf_size);
                        tree.set_loss(Loss::SquaredError);
                        tree.set_feature_sample_ratio(*feature_sample_ratio);

                        let mut cache = TrainingCache::get_cache(
                            n_features,
                            &train_x,
                            *training_optimization_level,
                        );
                        tree.fit(&train_x, &mut cache);

                        RegressionTree { tree }
                    })
                    .collect();

                Ok(RandomForestRegressor { trees, n_features })
            }
        }
    }

    fn check_width(&self, features: &[f64]) -> Result<(), EnsembleError> {
        if features.len() != self.n_features {
            return Err(EnsembleError::ModelShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        Ok(())
    }
}

impl EnsembleModel for RandomForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_members(&self) -> usize {
        self.trees.len()
    }

    fn members(&self) -> Vec<&dyn MemberEstimator> {
        self.trees.iter().map(|t| t as &dyn MemberEstimator).collect()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError> {
        self.check_width(features)?;
        let mut total = 0.0;
        for (index, tree) in self.trees.iter().enumerate() {
            total += tree.predict(features).map_err(|e| match e {
                EnsembleError::MemberPrediction { message, .. } => {
                    EnsembleError::MemberPrediction { index, message }
                }
                other => other,
            })?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
