use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::residue::Representation;
use crate::sequence::{vectorize, Sequence};
use crate::standardize::{standardize, ProteinFamily, StandardizedVector};

/// How a raw sequence becomes a model input: which residue property to use
/// and which reference length to resample to.
///
/// A model artifact records the `FeatureSpec` it was trained with; inference must use
/// the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FeatureSpec {
    pub representation: Representation,
    pub protein: ProteinFamily,
}

impl FeatureSpec {
    pub fn new(representation: Representation, protein: ProteinFamily) -> Self {
        FeatureSpec {
            representation,
            protein,
        }
    }

    /// Width of the feature vectors this spec produces.
    pub fn n_features(&self) -> usize {
        self.protein.reference_length()
    }

    pub fn featurize(&self, raw: &str) -> Result<StandardizedVector, FeatureError> {
        featurize(raw, self.representation, self.protein)
    }
}

/// Raw sequence → validated sequence → per-residue vector → reference length.
///
/// Example:
/// ```rust
/// use hivdr_features::{featurize, ProteinFamily, Representation};
///
/// let v = featurize("PQITLWQRPLVTIKIGG", Representation::MolecularWeight, ProteinFamily::Protease).unwrap();
/// assert_eq!(v.len(), 99);
/// ```
pub fn featurize(
    raw: &str,
    representation: Representation,
    protein: ProteinFamily,
) -> Result<StandardizedVector, FeatureError> {
    let sequence = Sequence::new(raw)?;
    let numeric = vectorize(&sequence, representation)?;
    standardize(&numeric, protein.reference_length())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_spec_matches_free_function() {
        let spec = FeatureSpec::new(Representation::IsoelectricPoint, ProteinFamily::Protease);
        let seq = "PQITLWQRPLVTIKIGGQLKEALLDTGADDTVLEE";
        assert_eq!(
            spec.featurize(seq).unwrap(),
            featurize(seq, Representation::IsoelectricPoint, ProteinFamily::Protease).unwrap()
        );
        assert_eq!(spec.n_features(), 99);
    }

    #[test]
    fn test_single_residue_is_degenerate() {
        let err = featurize("P", Representation::MolecularWeight, ProteinFamily::Protease)
            .unwrap_err();
        assert_eq!(err, FeatureError::DegenerateVector(1));
    }

    #[test]
    fn test_feature_spec_serde_names() {
        let spec = FeatureSpec::new(Representation::MolecularWeight, ProteinFamily::ReverseTranscriptase);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"representation":"mw","protein":"rt"}"#);
    }
}
