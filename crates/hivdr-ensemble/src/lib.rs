//! hivdr-ensemble: per-drug ensemble regressors with uncertainty.
//!
//! This crate holds the prediction core: the [`models::EnsembleModel`] contract
//! and its random-forest implementation, the single-drug
//! [`predictor::predict_with_range`] and the multi-drug
//! [`aggregate::predict_all`], plus the collaborators they need at runtime
//! (drug registry, model store and cache, interval statistics) and the
//! [`service::ResistancePredictor`] facade used by front ends.
//!
//! Models are loaded once, wrapped in `Arc`, and only ever read afterwards, so
//! a single predictor can serve concurrent requests without locking.
pub mod aggregate;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod models;
pub mod predictor;
pub mod registry;
pub mod service;
pub mod stats;
pub mod store;

pub use error::EnsembleError;
