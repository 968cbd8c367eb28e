//! Length standardizer: resample a per-residue vector onto a reference length.
//!
//! Observed sequences carry insertions and deletions relative to the
//! reference protein, so their vectors differ in length. A linear interpolant
//! is fitted over the natural positions `0..len-1` and sampled at
//! `target_length` evenly spaced points spanning `[0, target_length]`.
//!
//! Note the sampling domain is `[0, target_length]`, not `[0, len - 1]`: the
//! last few samples fall slightly beyond the observed positions and are
//! linearly extrapolated. Existing models were trained on features produced
//! this way, so the domain must not be "fixed" without retraining.
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use itertools_num::linspace;
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::sequence::NumericVector;

const PROTEASE_REFERENCE_LENGTH: usize = 99;
const REVERSE_TRANSCRIPTASE_REFERENCE_LENGTH: usize = 560;

/// Protein region a sequence (and a model) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProteinFamily {
    #[default]
    #[serde(rename = "protease")]
    Protease,
    #[serde(rename = "rt")]
    ReverseTranscriptase,
}

impl ProteinFamily {
    /// Length of the reference sequence features are resampled to.
    pub fn reference_length(&self) -> usize {
        match self {
            ProteinFamily::Protease => PROTEASE_REFERENCE_LENGTH,
            ProteinFamily::ReverseTranscriptase => REVERSE_TRANSCRIPTASE_REFERENCE_LENGTH,
        }
    }
}

impl fmt::Display for ProteinFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProteinFamily::Protease => "protease",
            ProteinFamily::ReverseTranscriptase => "rt",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ProteinFamily {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protease" | "pr" => Ok(ProteinFamily::Protease),
            "rt" | "reverse_transcriptase" => Ok(ProteinFamily::ReverseTranscriptase),
            other => Err(FeatureError::UnknownProteinFamily(other.to_string())),
        }
    }
}

/// A numeric vector resampled to a fixed reference length.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedVector {
    values: Vec<f64>,
}

impl StandardizedVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// Single-precision copy, the feature type of the tree models.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl From<Vec<f64>> for StandardizedVector {
    fn from(values: Vec<f64>) -> Self {
        StandardizedVector { values }
    }
}

impl From<StandardizedVector> for NumericVector {
    fn from(value: StandardizedVector) -> Self {
        NumericVector::new(value.values)
    }
}

impl Index<usize> for StandardizedVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

/// Piecewise-linear interpolant over `x = 0, 1, .., n-1`, extrapolating
/// with the first/last segment outside that range.
struct LinearInterpolator<'a> {
    y: &'a [f64],
}

impl<'a> LinearInterpolator<'a> {
    fn new(y: &'a [f64]) -> Self {
        debug_assert!(y.len() >= 2);
        LinearInterpolator { y }
    }

    fn at(&self, x: f64) -> f64 {
        let last = self.y.len() - 1;
        let lo = if x <= 0.0 {
            0
        } else {
            (x.floor() as usize).min(last - 1)
        };
        let slope = self.y[lo + 1] - self.y[lo];
        self.y[lo] + slope * (x - lo as f64)
    }
}

/// Resample `vector` to exactly `target_length` values.
///
/// # Errors
///
/// * [`FeatureError::DegenerateVector`] when `vector` has fewer than two points.
/// * [`FeatureError::InvalidTargetLength`] when `target_length` is zero.
pub fn standardize(
    vector: &NumericVector,
    target_length: usize,
) -> Result<StandardizedVector, FeatureError> {
    if vector.len() < 2 {
        return Err(FeatureError::DegenerateVector(vector.len()));
    }
    if target_length == 0 {
        return Err(FeatureError::InvalidTargetLength);
    }

    let interpolator = LinearInterpolator::new(vector.as_slice());
    let values: Vec<f64> = linspace::<f64>(0.0, target_length as f64, target_length)
        .map(|x| interpolator.at(x))
        .collect();

    log::trace!(
        "Standardized vector of length {} to length {}",
        vector.len(),
        values.len()
    );

    Ok(StandardizedVector { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolator_hits_knots_and_extrapolates() {
        let y = [1.0, 3.0, 2.0];
        let interp = LinearInterpolator::new(&y);
        assert_eq!(interp.at(0.0), 1.0);
        assert_eq!(interp.at(1.0), 3.0);
        assert_eq!(interp.at(2.0), 2.0);
        assert_eq!(interp.at(0.5), 2.0);
        // last segment slope is -1
        assert_eq!(interp.at(3.0), 1.0);
        // first segment slope is +2
        assert_eq!(interp.at(-1.0), -1.0);
    }

    #[test]
    fn test_standardize_uses_zero_to_target_domain() {
        // y = x over 0..=4; samples at linspace(0, 3, 3) = [0, 1.5, 3]
        let v = NumericVector::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let s = standardize(&v, 3).unwrap();
        assert_eq!(s.as_slice(), &[0.0, 1.5, 3.0]);
    }

    #[test]
    fn test_standardize_single_target_point() {
        let v = NumericVector::new(vec![5.0, 7.0]);
        let s = standardize(&v, 1).unwrap();
        assert_eq!(s.as_slice(), &[5.0]);
    }

    #[test]
    fn test_standardize_errors() {
        assert_eq!(
            standardize(&NumericVector::new(vec![1.0]), 10),
            Err(FeatureError::DegenerateVector(1))
        );
        assert_eq!(
            standardize(&NumericVector::new(vec![]), 10),
            Err(FeatureError::DegenerateVector(0))
        );
        assert_eq!(
            standardize(&NumericVector::new(vec![1.0, 2.0]), 0),
            Err(FeatureError::InvalidTargetLength)
        );
    }

    #[test]
    fn test_protein_family_reference_lengths() {
        assert_eq!(ProteinFamily::Protease.reference_length(), 99);
        assert_eq!(ProteinFamily::ReverseTranscriptase.reference_length(), 560);
        assert_eq!("RT".parse::<ProteinFamily>().unwrap(), ProteinFamily::ReverseTranscriptase);
        assert!("integrase".parse::<ProteinFamily>().is_err());
    }
}
