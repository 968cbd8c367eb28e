//! Integration tests for single-drug and multi-drug prediction.

use std::sync::Arc;

use hivdr_ensemble::aggregate::{predict_all, predict_points};
use hivdr_ensemble::models::{EnsembleModel, MemberEstimator};
use hivdr_ensemble::predictor::predict_with_range;
use hivdr_ensemble::store::ModelCache;
use hivdr_ensemble::EnsembleError;
use hivdr_features::{featurize, ProteinFamily, Representation, StandardizedVector};

const PROTEASE: &str = "PQITLWQRPLVTIKIGGQLKEALLDTGADDTVLEEMNLPGRWKPKMIGGIGGFIKVRQYDQILIEICGHKAIGTVLVGPTPVNIIGRNLLTQIGCTLNF";

/// Member whose prediction is an affine function of the first feature.
struct Affine {
    slope: f64,
    offset: f64,
}

impl MemberEstimator for Affine {
    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError> {
        Ok(self.slope * features[0] + self.offset)
    }
}

struct AffineEnsemble {
    members: Vec<Affine>,
}

impl EnsembleModel for AffineEnsemble {
    fn n_features(&self) -> usize {
        99
    }

    fn members(&self) -> Vec<&dyn MemberEstimator> {
        self.members.iter().map(|m| m as &dyn MemberEstimator).collect()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, EnsembleError> {
        let mut total = 0.0;
        for m in &self.members {
            total += m.predict(features)?;
        }
        Ok(total / self.members.len() as f64)
    }
}

fn ensemble(offsets: &[f64]) -> Arc<dyn EnsembleModel> {
    Arc::new(AffineEnsemble {
        members: offsets
            .iter()
            .map(|&offset| Affine { slope: 0.0, offset })
            .collect(),
    })
}

fn protease_vector() -> StandardizedVector {
    featurize(PROTEASE, Representation::MolecularWeight, ProteinFamily::Protease).unwrap()
}

#[test]
fn three_member_model_gives_three_records() {
    let mut cache = ModelCache::new();
    cache.insert("FPV", ensemble(&[0.2, 0.4, 0.6]));

    let records = predict_all(&["FPV"], &cache, &protease_vector()).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.drug == "FPV"));
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![0.2, 0.4, 0.6]);
}

#[test]
fn record_count_is_drugs_times_members() {
    let drugs = ["FPV", "ATV", "IDV", "LPV", "NFV", "SQV", "TPV", "DRV"];
    let mut cache = ModelCache::new();
    for (i, drug) in drugs.iter().enumerate() {
        cache.insert(*drug, ensemble(&[i as f64; 4]));
    }

    let records = predict_all(&drugs, &cache, &protease_vector()).unwrap();
    assert_eq!(records.len(), drugs.len() * 4);

    // grouped by drug in caller order
    for (i, chunk) in records.chunks(4).enumerate() {
        assert!(chunk.iter().all(|r| r.drug == drugs[i]));
        assert!(chunk.iter().all(|r| r.value == i as f64));
    }

    let points = predict_points(&drugs, &cache, &protease_vector()).unwrap();
    assert_eq!(points.len(), drugs.len());
    assert_eq!(points[7].drug, "DRV");
}

#[test]
fn unknown_drug_fails_whole_call() {
    let mut cache = ModelCache::new();
    cache.insert("FPV", ensemble(&[0.1]));

    let err = predict_all(&["FPV", "XYZ"], &cache, &protease_vector()).unwrap_err();
    assert!(matches!(err, EnsembleError::UnknownDrug(ref d) if d == "XYZ"));
}

#[test]
fn point_estimate_is_member_mean_for_averaging_models() {
    let model = AffineEnsemble {
        members: vec![
            Affine { slope: 0.0, offset: 1.0 },
            Affine { slope: 0.0, offset: 3.0 },
        ],
    };
    let prediction = predict_with_range(&model, &protease_vector()).unwrap();
    assert_eq!(prediction.member_predictions, vec![1.0, 3.0]);
    assert_eq!(prediction.point_estimate, 2.0);
}

#[test]
fn reverse_transcriptase_vector_does_not_fit_protease_model() {
    let rt = featurize(PROTEASE, Representation::MolecularWeight, ProteinFamily::ReverseTranscriptase)
        .unwrap();
    let model = AffineEnsemble {
        members: vec![Affine { slope: 1.0, offset: 0.0 }],
    };
    let err = predict_with_range(&model, &rt).unwrap_err();
    assert!(matches!(
        err,
        EnsembleError::ModelShapeMismatch { expected: 99, actual: 560 }
    ));
}
