use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::aggregate::PredictionRecord;
use crate::error::EnsembleError;
use crate::predictor::EnsemblePrediction;

/// Percentile of already sorted data, with linear interpolation between
/// order statistics (the same definition as numpy's default).
///
/// # Arguments
///
/// * `sorted` - Non-empty data in ascending order.
/// * `p` - Percentile in `[0, 100]`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// Box-plot style summary of a prediction distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    pub min: f64,
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
    pub max: f64,
}

/// The 0th, lower, 50th, upper and 100th percentiles of `values`.
///
/// `percentile` is the central coverage: 95 gives the 2.5th and 97.5th
/// percentiles as the lower and upper bounds.
pub fn intervals(values: &[f64], percentile_width: f64) -> Result<PredictionInterval, EnsembleError> {
    if !(percentile_width > 0.0 && percentile_width <= 100.0) {
        return Err(EnsembleError::InvalidPercentile(percentile_width));
    }
    if values.is_empty() {
        return Err(EnsembleError::MemberPrediction {
            index: 0,
            message: "no member predictions to summarize".to_string(),
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let low = (100.0 - percentile_width) / 2.0;
    let upp = 100.0 - low;

    Ok(PredictionInterval {
        min: percentile(&sorted, 0.0),
        lower: percentile(&sorted, low),
        median: percentile(&sorted, 50.0),
        upper: percentile(&sorted, upp),
        max: percentile(&sorted, 100.0),
    })
}

/// Per-drug summary of an ensemble prediction.
///
/// Kept flat so it can be written as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugSummary {
    pub drug: String,
    pub n_members: usize,
    pub point_estimate: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub percentile: f64,
    pub min: f64,
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
    pub max: f64,
}

impl DrugSummary {
    pub fn from_prediction(
        drug: impl Into<String>,
        prediction: &EnsemblePrediction,
        percentile_width: f64,
    ) -> Result<Self, EnsembleError> {
        let members = &prediction.member_predictions;
        let interval = intervals(members, percentile_width)?;
        let mean = members.iter().mean();
        // single-member ensembles have no spread
        let std_dev = if members.len() > 1 {
            members.iter().std_dev()
        } else {
            0.0
        };

        Ok(DrugSummary {
            drug: drug.into(),
            n_members: members.len(),
            point_estimate: prediction.point_estimate,
            mean,
            std_dev,
            percentile: percentile_width,
            min: interval.min,
            lower: interval.lower,
            median: interval.median,
            upper: interval.upper,
            max: interval.max,
        })
    }

    pub fn interval(&self) -> PredictionInterval {
        PredictionInterval {
            min: self.min,
            lower: self.lower,
            median: self.median,
            upper: self.upper,
            max: self.max,
        }
    }
}

/// Summarize long-format records, one [`DrugSummary`] per drug in order of
/// first appearance.
///
/// Records carry no separate aggregate, so the point estimate reported is
/// the member mean.
pub fn summarize(
    records: &[PredictionRecord],
    percentile_width: f64,
) -> Result<Vec<DrugSummary>, EnsembleError> {
    let mut grouped: Vec<(&str, Vec<f64>)> = Vec::new();
    for record in records {
        match grouped.iter_mut().find(|(drug, _)| *drug == record.drug) {
            Some((_, values)) => values.push(record.value),
            None => grouped.push((record.drug.as_str(), vec![record.value])),
        }
    }

    grouped
        .into_iter()
        .map(|(drug, values)| {
            let prediction = EnsemblePrediction {
                point_estimate: values.iter().mean(),
                member_predictions: values,
            };
            DrugSummary::from_prediction(drug, &prediction, percentile_width)
        })
        .collect()
}

/// Held-out regression quality of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub n_samples: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    /// NaN when either side is constant.
    pub pearson_r: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self, EnsembleError> {
        if y_true.len() != y_pred.len() {
            return Err(EnsembleError::Training(format!(
                "cannot score {} predictions against {} targets",
                y_pred.len(),
                y_true.len()
            )));
        }
        if y_true.len() < 2 {
            return Err(EnsembleError::Training(
                "at least two samples are required to compute metrics".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let residuals: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| t - p).collect();
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;

        let mean_true = y_true.iter().mean();
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true).powi(2)).sum();

        let covariance = y_true.iter().covariance(y_pred.iter());
        let pearson_r = covariance / (y_true.iter().std_dev() * y_pred.iter().std_dev());

        Ok(RegressionMetrics {
            n_samples: y_true.len(),
            rmse: (ss_res / n).sqrt(),
            mae,
            r2: 1.0 - ss_res / ss_tot,
            pearson_r,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_matches_linear_definition() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 4.0);
        assert_eq!(percentile(&sorted, 50.0), 2.5);
        assert!((percentile(&sorted, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_intervals_are_ordered() {
        let values = [0.3, -0.2, 1.1, 0.8, 0.0, 0.5, 0.45];
        let iv = intervals(&values, 95.0).unwrap();
        assert_eq!(iv.min, -0.2);
        assert_eq!(iv.max, 1.1);
        assert_eq!(iv.median, 0.45);
        assert!(iv.min <= iv.lower && iv.lower <= iv.median);
        assert!(iv.median <= iv.upper && iv.upper <= iv.max);
    }

    #[test]
    fn test_intervals_reject_bad_input() {
        assert!(matches!(
            intervals(&[1.0], 0.0),
            Err(EnsembleError::InvalidPercentile(_))
        ));
        assert!(matches!(
            intervals(&[1.0], 120.0),
            Err(EnsembleError::InvalidPercentile(_))
        ));
        assert!(intervals(&[], 95.0).is_err());
    }

    #[test]
    fn test_summary_from_prediction() {
        let prediction = EnsemblePrediction {
            point_estimate: 2.0,
            member_predictions: vec![1.0, 2.0, 3.0],
        };
        let summary = DrugSummary::from_prediction("LPV", &prediction, 95.0).unwrap();
        assert_eq!(summary.drug, "LPV");
        assert_eq!(summary.n_members, 3);
        assert!((summary.mean - 2.0).abs() < 1e-12);
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(summary.interval().median, 2.0);
    }

    #[test]
    fn test_summarize_records_keeps_drug_order() {
        let records: Vec<PredictionRecord> = [("SQV", 1.0), ("FPV", 0.0), ("SQV", 3.0), ("FPV", 2.0)]
            .iter()
            .map(|&(drug, value)| PredictionRecord {
                drug: drug.to_string(),
                value,
            })
            .collect();
        let summaries = summarize(&records, 95.0).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].drug, "SQV");
        assert_eq!(summaries[0].point_estimate, 2.0);
        assert_eq!(summaries[1].drug, "FPV");
        assert_eq!(summaries[1].n_members, 2);
        assert!(summarize(&[], 95.0).unwrap().is_empty());
    }

    #[test]
    fn test_regression_metrics_perfect_fit() {
        let y = [0.1, 0.5, 1.2, 2.0];
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert!(m.rmse.abs() < 1e-12);
        assert!(m.mae.abs() < 1e-12);
        assert!((m.r2 - 1.0).abs() < 1e-12);
        assert!((m.pearson_r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_metrics_length_mismatch() {
        assert!(RegressionMetrics::compute(&[1.0, 2.0], &[1.0]).is_err());
    }
}
