use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::EnsembleError;
use crate::models::ensemble_trait::{EnsembleModel, MemberEstimator};
use crate::models::forest::RandomForestRegressor;

/// A trained, persistable ensemble. One variant per `ModelType`.
#[derive(Debug, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForestRegressor),
}

impl TrainedModel {
    fn inner(&self) -> &dyn EnsembleModel {
        match self {
            TrainedModel::RandomForest(model) => model,
        }
    }
}

impl EnsembleModel for TrainedModel {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_members(&self) -> usize {
        self.inner().n_members()
    }

    fn members(&self) -> Vec<&dyn MemberEstimator> {
        self.inner().members()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError> {
        self.inner().predict(features)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

/// Fit the model described by `config` on `x` / `y`.
pub fn fit_model(
    config: &ModelConfig,
    x: &Array2<f32>,
    y: &[f32],
) -> Result<TrainedModel, EnsembleError> {
    match config.model_type {
        ModelType::RandomForest { .. } => Ok(TrainedModel::RandomForest(
            RandomForestRegressor::fit(x, y, config)?,
        )),
    }
}
