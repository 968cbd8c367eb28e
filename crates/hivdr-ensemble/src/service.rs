//! The front-end facing predictor: registry, loaded models and feature spec
//! bundled together.
use hivdr_features::{FeatureSpec, StandardizedVector};

use crate::aggregate::{predict_all, predict_points, predict_ranges, PredictionRecord};
use crate::error::EnsembleError;
use crate::models::EnsembleModel;
use crate::registry::DrugRegistry;
use crate::stats::DrugSummary;
use crate::store::{ModelCache, ModelStore};

/// Predicts resistance of one sequence against every registered drug.
///
/// Immutable after construction; share it behind an `Arc` to serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct ResistancePredictor {
    registry: DrugRegistry,
    models: ModelCache,
    features: FeatureSpec,
}

impl ResistancePredictor {
    /// Check that `models` covers every drug in `registry` and that each model
    /// accepts vectors of the width `features` produces.
    pub fn new(
        registry: DrugRegistry,
        models: ModelCache,
        features: FeatureSpec,
    ) -> Result<Self, EnsembleError> {
        let width = features.n_features();
        for drug in registry.iter() {
            let model = models
                .get(drug)
                .ok_or_else(|| EnsembleError::UnknownDrug(drug.clone()))?;
            if model.n_features() != width {
                return Err(EnsembleError::ModelShapeMismatch {
                    expected: model.n_features(),
                    actual: width,
                });
            }
        }

        Ok(ResistancePredictor {
            registry,
            models,
            features,
        })
    }

    pub fn from_store(
        store: &dyn ModelStore,
        registry: DrugRegistry,
        features: FeatureSpec,
    ) -> Result<Self, EnsembleError> {
        let models = ModelCache::preload(store, &registry)?;
        Self::new(registry, models, features)
    }

    pub fn drugs(&self) -> &[String] {
        self.registry.drugs()
    }

    pub fn features(&self) -> FeatureSpec {
        self.features
    }

    pub fn model(&self, drug: &str) -> Option<&dyn EnsembleModel> {
        self.models
            .get(drug)
            .map(|m| -> &dyn EnsembleModel { m.as_ref() })
    }

    pub fn featurize(&self, raw: &str) -> Result<StandardizedVector, EnsembleError> {
        Ok(self.features.featurize(raw)?)
    }

    /// Long-format member predictions for every registered drug.
    pub fn predict(&self, raw: &str) -> Result<Vec<PredictionRecord>, EnsembleError> {
        let vector = self.featurize(raw)?;
        predict_all(self.registry.drugs(), &self.models, &vector)
    }

    pub fn predict_points(&self, raw: &str) -> Result<Vec<PredictionRecord>, EnsembleError> {
        let vector = self.featurize(raw)?;
        predict_points(self.registry.drugs(), &self.models, &vector)
    }

    /// One [`DrugSummary`] per registered drug, in registry order.
    pub fn summarize(&self, raw: &str, percentile: f64) -> Result<Vec<DrugSummary>, EnsembleError> {
        let vector = self.featurize(raw)?;
        predict_ranges(self.registry.drugs(), &self.models, &vector)?
            .iter()
            .map(|(drug, prediction)| DrugSummary::from_prediction(drug.as_str(), prediction, percentile))
            .collect()
    }
}
