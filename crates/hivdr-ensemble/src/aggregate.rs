//! Multi-drug aggregation into a long-format (drug x member) table.
use hivdr_features::StandardizedVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;
use crate::predictor::{predict_with_range, EnsemblePrediction};
use crate::store::ModelCache;

/// One observation: a single ensemble member's prediction for one drug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub drug: String,
    /// Predicted log10 fold-change in resistance.
    #[serde(rename = "log10(DR)")]
    pub value: f64,
}

/// Run [`predict_with_range`] for every drug, keeping caller order.
///
/// Every drug is resolved against `models` before any prediction runs, so a
/// missing model fails the whole call with [`EnsembleError::UnknownDrug`].
/// Drugs are predicted in parallel on the rayon pool.
pub fn predict_ranges<S>(
    drugs: &[S],
    models: &ModelCache,
    vector: &StandardizedVector,
) -> Result<Vec<(String, EnsemblePrediction)>, EnsembleError>
where
    S: AsRef<str> + Sync,
{
    let resolved = drugs
        .iter()
        .map(|drug| {
            let drug = drug.as_ref();
            models
                .get(drug)
                .map(|model| (drug, model))
                .ok_or_else(|| EnsembleError::UnknownDrug(drug.to_string()))
        })
        .collect::<Result<Vec<_>, EnsembleError>>()?;

    resolved
        .par_iter()
        .map(|&(drug, model)| -> Result<(String, EnsemblePrediction), EnsembleError> {
            let prediction = predict_with_range(&**model, vector)?;
            log::debug!(
                "{}: point estimate {:.4} from {} members",
                drug,
                prediction.point_estimate,
                prediction.member_predictions.len()
            );
            Ok((drug.to_string(), prediction))
        })
        .collect()
}

/// Predict every drug and flatten to one record per (drug, member).
///
/// Records are ordered by drug (caller order), then by member (model order).
pub fn predict_all<S>(
    drugs: &[S],
    models: &ModelCache,
    vector: &StandardizedVector,
) -> Result<Vec<PredictionRecord>, EnsembleError>
where
    S: AsRef<str> + Sync,
{
    let records = predict_ranges(drugs, models, vector)?
        .into_iter()
        .flat_map(|(drug, prediction)| {
            prediction
                .member_predictions
                .into_iter()
                .map(move |value| PredictionRecord {
                    drug: drug.clone(),
                    value,
                })
        })
        .collect();
    Ok(records)
}

/// One record per drug carrying only the point estimate.
pub fn predict_points<S>(
    drugs: &[S],
    models: &ModelCache,
    vector: &StandardizedVector,
) -> Result<Vec<PredictionRecord>, EnsembleError>
where
    S: AsRef<str> + Sync,
{
    Ok(predict_ranges(drugs, models, vector)?
        .into_iter()
        .map(|(drug, prediction)| PredictionRecord {
            drug,
            value: prediction.point_estimate,
        })
        .collect())
}
