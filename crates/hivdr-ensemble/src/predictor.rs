//! Single-drug prediction with the full spread of member predictions.
use hivdr_features::StandardizedVector;
use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;
use crate::models::EnsembleModel;

/// Point estimate plus every member's individual prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    pub point_estimate: f64,
    /// In the model's native member order.
    pub member_predictions: Vec<f64>,
}

/// Predict `vector` with `model`, returning the aggregate and per-member values.
///
/// The point estimate is the model's own aggregate; it is not recomputed
/// from the member predictions. Any member failure aborts the call.
///
/// # Errors
///
/// [`EnsembleError::ModelShapeMismatch`] when the vector width differs from
/// the width the model was trained on.
pub fn predict_with_range(
    model: &dyn EnsembleModel,
    vector: &StandardizedVector,
) -> Result<EnsemblePrediction, EnsembleError> {
    if vector.len() != model.n_features() {
        return Err(EnsembleError::ModelShapeMismatch {
            expected: model.n_features(),
            actual: vector.len(),
        });
    }

    let features = vector.as_slice();
    let point_estimate = model.predict(features)?;

    let member_predictions = model
        .members()
        .into_iter()
        .map(|member| member.predict(features))
        .collect::<Result<Vec<f64>, EnsembleError>>()?;

    Ok(EnsemblePrediction {
        point_estimate,
        member_predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberEstimator;

    struct Fixed(f64);

    impl MemberEstimator for Fixed {
        fn predict(&self, _features: &[f64]) -> Result<f64, EnsembleError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl MemberEstimator for Failing {
        fn predict(&self, _features: &[f64]) -> Result<f64, EnsembleError> {
            Err(EnsembleError::MemberPrediction {
                index: 1,
                message: "boom".to_string(),
            })
        }
    }

    struct Toy {
        members: Vec<Box<dyn MemberEstimator>>,
        width: usize,
    }

    impl EnsembleModel for Toy {
        fn n_features(&self) -> usize {
            self.width
        }

        fn members(&self) -> Vec<&dyn MemberEstimator> {
            self.members.iter().map(|m| m.as_ref()).collect()
        }

        // Deliberately not the member mean, to show the aggregate is delegated.
        fn predict(&self, _features: &[f64]) -> Result<f64, EnsembleError> {
            Ok(100.0)
        }
    }

    #[test]
    fn test_point_estimate_is_delegated_and_members_keep_order() {
        let model = Toy {
            members: vec![Box::new(Fixed(0.5)), Box::new(Fixed(1.5)), Box::new(Fixed(-0.25))],
            width: 4,
        };
        let vector = StandardizedVector::from(vec![0.0; 4]);
        let prediction = predict_with_range(&model, &vector).unwrap();
        assert_eq!(prediction.point_estimate, 100.0);
        assert_eq!(prediction.member_predictions, vec![0.5, 1.5, -0.25]);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = Toy {
            members: vec![Box::new(Fixed(0.5))],
            width: 99,
        };
        let vector = StandardizedVector::from(vec![0.0; 98]);
        let err = predict_with_range(&model, &vector).unwrap_err();
        assert!(matches!(
            err,
            EnsembleError::ModelShapeMismatch { expected: 99, actual: 98 }
        ));
    }

    #[test]
    fn test_member_failure_aborts() {
        let model = Toy {
            members: vec![Box::new(Fixed(0.5)), Box::new(Failing), Box::new(Fixed(2.0))],
            width: 2,
        };
        let vector = StandardizedVector::from(vec![0.0; 2]);
        let err = predict_with_range(&model, &vector).unwrap_err();
        assert!(matches!(err, EnsembleError::MemberPrediction { index: 1, .. }));
    }
}
