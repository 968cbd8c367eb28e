pub mod ensemble_trait;
pub mod factory;
pub mod forest;

pub use ensemble_trait::{EnsembleModel, MemberEstimator};
pub use factory::{fit_model, TrainedModel};
pub use forest::{RandomForestRegressor, RegressionTree};
