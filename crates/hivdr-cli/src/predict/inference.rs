use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hivdr_ensemble::service::ResistancePredictor;
use hivdr_ensemble::store::FileModelStore;
use rayon::prelude::*;

use crate::load_data::{read_fasta, FastaRecord};
use crate::predict::input::PredictConfig;
use crate::predict::output::{write_predictions, write_summaries, SequencePredictions, SequenceSummaries};
use crate::util::write_json;

/// Collect the query sequences named by `config`, inline sequence first.
pub fn collect_inputs(config: &PredictConfig) -> Result<Vec<FastaRecord>> {
    let mut inputs = Vec::new();
    if let Some(sequence) = &config.sequence {
        inputs.push(FastaRecord {
            id: String::from("query"),
            sequence: sequence.clone(),
        });
    }
    if let Some(fasta) = &config.fasta {
        let records = read_fasta(fasta)?;
        log::info!("Read {} sequences from {}", records.len(), fasta);
        inputs.extend(records);
    }
    if inputs.is_empty() {
        anyhow::bail!("No sequences to predict");
    }
    Ok(inputs)
}

/// Load the models named by `config` and build a predictor.
pub fn load_predictor(config: &PredictConfig) -> Result<ResistancePredictor> {
    let registry = config.registry()?;
    let features = config.feature_spec();
    let store = FileModelStore::new(&config.model_dir, features);

    log::info!(
        "Loading {} models from {} ({} / {})",
        registry.len(),
        config.model_dir,
        features.representation,
        features.protein
    );
    ResistancePredictor::from_store(&store, registry, features)
        .with_context(|| format!("Failed to load models from {}", config.model_dir))
}

pub fn run_prediction(config: &PredictConfig) -> Result<()> {
    let inputs = collect_inputs(config)?;
    let predictor = load_predictor(config)?;

    let results = inputs
        .par_iter()
        .map(|input| {
            predictor
                .predict(&input.sequence)
                .map(|records| SequencePredictions {
                    seq_id: input.id.clone(),
                    records,
                })
                .with_context(|| format!("Prediction failed for sequence '{}'", input.id))
        })
        .collect::<Result<Vec<_>>>()?;

    let output_path = config.output_file.as_ref().map(PathBuf::from);
    write_predictions(&results, output_path.as_deref())?;
    if let Some(path) = &output_path {
        log::info!(
            "[HIVDR::Predict] Wrote {} records to {:?}",
            results.iter().map(|r| r.records.len()).sum::<usize>(),
            path
        );
    }

    if let Some(summary_file) = &config.summary_file {
        let summaries = inputs
            .par_iter()
            .map(|input| {
                predictor
                    .summarize(&input.sequence, config.interval_percentile)
                    .map(|summaries| SequenceSummaries {
                        seq_id: input.id.clone(),
                        summaries,
                    })
                    .with_context(|| format!("Summary failed for sequence '{}'", input.id))
            })
            .collect::<Result<Vec<_>>>()?;
        write_summaries(&summaries, Path::new(summary_file))?;
        log::info!("[HIVDR::Predict] Wrote interval summaries to {}", summary_file);
    }

    if let Some(path) = &output_path {
        let config_path = path.with_extension("config.json");
        write_json(config, &config_path)?;
        log::debug!("Wrote effective config to {:?}", config_path);
    }

    Ok(())
}
