//! hivdr-features: turn amino-acid sequences into fixed-length numeric vectors.
//!
//! The pipeline is three small steps, each usable on its own:
//!
//! 1. [`residue`] maps a single residue letter to a physicochemical scalar
//!    (molecular weight or isoelectric point).
//! 2. [`sequence`] validates a raw sequence and vectorizes it residue by residue.
//! 3. [`standardize`] resamples the variable-length vector onto the reference
//!    length of a protein family so it can be fed to a fixed-width regressor.
//!
//! [`featurize::FeatureSpec`] chains the three and is shared by training and
//! inference so both sides always see identical features.
pub mod error;
pub mod featurize;
pub mod residue;
pub mod sequence;
pub mod standardize;

pub use error::FeatureError;
pub use featurize::{featurize, FeatureSpec};
pub use residue::{encode, Representation, ResidueTable};
pub use sequence::{vectorize, vectorize_str, NumericVector, Sequence};
pub use standardize::{standardize, ProteinFamily, StandardizedVector};
