use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hivdr_ensemble::aggregate::PredictionRecord;
use hivdr_ensemble::stats::DrugSummary;

use crate::util::delimiter_for;

/// Predictions for one input sequence.
#[derive(Debug, Clone)]
pub struct SequencePredictions {
    pub seq_id: String,
    pub records: Vec<PredictionRecord>,
}

#[derive(Debug, Clone)]
pub struct SequenceSummaries {
    pub seq_id: String,
    pub summaries: Vec<DrugSummary>,
}

fn open_writer(output_path: Option<&Path>) -> Result<(Box<dyn Write>, u8)> {
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Ok((Box::new(BufWriter::new(file)), delimiter_for(path)))
        }
        None => Ok((Box::new(io::stdout()), b',')),
    }
}

/// Write long-format `seq_id,drug,log10(DR)` rows to `output_path`, or to
/// stdout when no path is given. The delimiter follows the file extension.
pub fn write_predictions(results: &[SequencePredictions], output_path: Option<&Path>) -> Result<()> {
    let (sink, delimiter) = open_writer(output_path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);

    writer.write_record(["seq_id", "drug", "log10(DR)"])?;
    for result in results {
        for record in &result.records {
            writer.write_record([
                result.seq_id.as_str(),
                record.drug.as_str(),
                format!("{:.6}", record.value).as_str(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write one row per (sequence, drug) with the interval summary.
pub fn write_summaries(results: &[SequenceSummaries], output_path: &Path) -> Result<()> {
    let (sink, delimiter) = open_writer(Some(output_path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);

    writer.write_record([
        "seq_id",
        "drug",
        "n_members",
        "point_estimate",
        "mean",
        "std_dev",
        "percentile",
        "min",
        "lower",
        "median",
        "upper",
        "max",
    ])?;

    for result in results {
        for s in &result.summaries {
            writer.write_record(&[
                result.seq_id.clone(),
                s.drug.clone(),
                s.n_members.to_string(),
                format!("{:.6}", s.point_estimate),
                format!("{:.6}", s.mean),
                format!("{:.6}", s.std_dev),
                format!("{}", s.percentile),
                format!("{:.6}", s.min),
                format!("{:.6}", s.lower),
                format!("{:.6}", s.median),
                format!("{:.6}", s.upper),
                format!("{:.6}", s.max),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
