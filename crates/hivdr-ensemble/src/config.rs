use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Central configuration for ensemble models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported ensemble types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    /// Bagged regression trees; every tree is an independent ensemble member.
    RandomForest {
        n_estimators: usize,
        max_depth: u32,
        min_leaf_size: usize,
        /// Fraction of features each tree may split on (1.0 = all).
        feature_sample_ratio: f64,
        /// Draw a bootstrap sample per tree; when false every tree sees all rows.
        bootstrap: bool,
        training_optimization_level: u8,
        seed: u64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_estimators: 500,
            max_depth: 12,
            min_leaf_size: 1,
            feature_sample_ratio: 1.0,
            bootstrap: true,
            training_optimization_level: 2,
            seed: 42,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::RandomForest { .. } => "random_forest",
        }
    }

    /// Number of members the trained ensemble will have.
    pub fn n_members(&self) -> usize {
        match self {
            ModelType::RandomForest { n_estimators, .. } => *n_estimators,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random_forest" | "randomforest" | "rf" => Ok(ModelType::default()),
            _ => Err(format!(
                "Unknown model type: {}. Supported model types: random_forest",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}
