use hivdr_features::{FeatureError, FeatureSpec};
use thiserror::Error;

/// Errors raised by model loading, prediction and training.
#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("Model expects {expected} features but the input vector has {actual}")]
    ModelShapeMismatch { expected: usize, actual: usize },

    /// A requested drug has no model in the cache or registry.
    #[error("No model available for drug '{0}'")]
    UnknownDrug(String),

    /// The model store has no persisted artifact for this drug.
    #[error("Model artifact not found for drug '{0}'")]
    ModelNotFound(String),

    #[error("Model for drug '{drug}' was trained with {found:?}, but {expected:?} was requested")]
    IncompatibleArtifact {
        drug: String,
        expected: FeatureSpec,
        found: FeatureSpec,
    },

    #[error("Ensemble member {index} failed to predict: {message}")]
    MemberPrediction { index: usize, message: String },

    #[error("Invalid drug registry: {0}")]
    InvalidRegistry(String),

    #[error("Percentile must be in (0, 100], got {0}")]
    InvalidPercentile(f64),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
