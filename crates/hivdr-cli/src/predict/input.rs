use anyhow::{Context, Result};
use clap::ArgMatches;
use hivdr_ensemble::registry::{DrugClass, DrugRegistry};
use hivdr_features::{FeatureSpec, ProteinFamily, Representation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::util::validate_fasta_file;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PredictConfig {
    pub version: String,
    pub model_dir: String,
    pub drug_class: DrugClass,
    /// Explicit drug list; the class defaults are used when absent.
    pub drugs: Option<Vec<String>>,
    pub representation: Representation,
    /// Overrides the protein family implied by `drug_class`.
    pub protein: Option<ProteinFamily>,
    pub sequence: Option<String>,
    pub fasta: Option<String>,
    /// Long-format records go to stdout when absent.
    pub output_file: Option<String>,
    pub summary_file: Option<String>,
    pub interval_percentile: f64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            version: clap::crate_version!().to_string(),
            model_dir: String::from("models"),
            drug_class: DrugClass::Protease,
            drugs: None,
            representation: Representation::MolecularWeight,
            protein: None,
            sequence: None,
            fasta: None,
            output_file: None,
            summary_file: None,
            interval_percentile: 95.0,
        }
    }
}

impl PredictConfig {
    pub fn from_json(config_path: &PathBuf) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let partial: serde_json::Value = serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        let mut config = PredictConfig::default();

        macro_rules! load_or_default {
            ($field:ident) => {
                if let Some(val) = partial.get(stringify!($field)) {
                    if let Ok(parsed) = serde_json::from_value(val.clone()) {
                        config.$field = parsed;
                    } else {
                        log::warn!(
                            "Config Invalid value for '{}', using default: {:?}",
                            stringify!($field),
                            config.$field
                        );
                    }
                } else {
                    log::debug!(
                        "Config Missing field '{}', using default: {:?}",
                        stringify!($field),
                        config.$field
                    );
                }
            };
        }

        load_or_default!(model_dir);
        load_or_default!(drug_class);
        load_or_default!(drugs);
        load_or_default!(representation);
        load_or_default!(protein);
        load_or_default!(sequence);
        load_or_default!(fasta);
        load_or_default!(output_file);
        load_or_default!(summary_file);
        load_or_default!(interval_percentile);

        Ok(config)
    }

    /// Load `config_path` when given, otherwise start from defaults, then
    /// apply command line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_json(path)?,
            None => {
                log::info!("[HIVDR::Predict] No config file provided; using defaults.");
                PredictConfig::default()
            }
        };
        config.apply_overrides(matches)?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(sequence) = matches.get_one::<String>("sequence") {
            self.sequence = Some(sequence.clone());
        }
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            self.fasta = Some(fasta.clone());
        }
        if let Some(model_dir) = matches.get_one::<String>("model_dir") {
            self.model_dir = model_dir.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            self.output_file = Some(output_file.clone());
        }
        if let Some(summary_file) = matches.get_one::<String>("summary_file") {
            self.summary_file = Some(summary_file.clone());
        }
        if let Some(drug_class) = matches.get_one::<String>("drug_class") {
            self.drug_class = drug_class.parse()?;
        }
        if let Some(drugs) = matches.get_many::<String>("drugs") {
            self.drugs = Some(drugs.cloned().collect());
        }
        if let Some(representation) = matches.get_one::<String>("representation") {
            self.representation = representation.parse()?;
        }
        if let Some(percentile) = matches.get_one::<f64>("percentile") {
            self.interval_percentile = *percentile;
        }

        if self.sequence.is_none() && self.fasta.is_none() {
            anyhow::bail!("No input given: provide a sequence (-s) or a FASTA file (-f)");
        }
        if let Some(fasta) = &self.fasta {
            validate_fasta_file(fasta)?;
        }
        Ok(())
    }

    pub fn registry(&self) -> Result<DrugRegistry> {
        Ok(match &self.drugs {
            Some(drugs) => DrugRegistry::new(drugs.as_slice())?,
            None => DrugRegistry::for_class(self.drug_class),
        })
    }

    pub fn feature_spec(&self) -> FeatureSpec {
        FeatureSpec::new(
            self.representation,
            self.protein.unwrap_or_else(|| self.drug_class.protein_family()),
        )
    }
}
