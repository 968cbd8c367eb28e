use crate::error::EnsembleError;

/// One independently trained member of an ensemble.
pub trait MemberEstimator: Send + Sync {
    /// Predict a single sample.
    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError>;
}

/// A trained regressor made of independent member estimators.
///
/// The core never mutates a model after it is loaded; implementations must
/// be safe to query from several threads at once.
pub trait EnsembleModel: Send + Sync {
    /// Width of the feature vector the model was trained on.
    fn n_features(&self) -> usize;

    fn n_members(&self) -> usize {
        self.members().len()
    }

    /// Members in the model's native order.
    fn members(&self) -> Vec<&dyn MemberEstimator>;

    /// The ensemble's own aggregate prediction (e.g. the mean over members).
    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "ensemble"
    }
}
