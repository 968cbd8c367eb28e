use anyhow::{Context, Result};
use clap::ArgMatches;
use hivdr_ensemble::config::{ModelConfig, ModelType};
use hivdr_ensemble::registry::{DrugClass, DrugRegistry};
use hivdr_features::{FeatureSpec, ProteinFamily, Representation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::util::{validate_fasta_file, validate_tsv_or_csv_file};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainConfig {
    pub version: String,
    pub train_data: String,
    pub model_dir: String,
    pub drug_class: DrugClass,
    pub drugs: Option<Vec<String>>,
    pub representation: Representation,
    pub protein: Option<ProteinFamily>,
    /// FASTA whose first record fills in `-` cells of position columns.
    pub consensus_fasta: Option<String>,
    /// Held-out fraction for evaluation; 0 skips evaluation.
    pub test_size: f64,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            version: clap::crate_version!().to_string(),
            train_data: String::new(),
            model_dir: String::from("models"),
            drug_class: DrugClass::Protease,
            drugs: None,
            representation: Representation::MolecularWeight,
            protein: None,
            consensus_fasta: None,
            test_size: 0.2,
            seed: 42,
            model: ModelConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_json(config_path: &PathBuf) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let partial: serde_json::Value = serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        let mut config = TrainConfig::default();

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

        load_or_default!(train_data);
        load_or_default!(model_dir);
        load_or_default!(drug_class);
        load_or_default!(drugs);
        load_or_default!(representation);
        load_or_default!(protein);
        load_or_default!(consensus_fasta);
        load_or_default!(test_size);
        load_or_default!(seed);
        load_or_default!(model);

        Ok(config)
    }

    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_json(path)?,
            None => {
                log::info!("[HIVDR::Train] No config file provided; using defaults.");
                TrainConfig::default()
            }
        };
        config.apply_overrides(matches)?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            self.train_data = train_data.clone();
        }
        if let Some(model_dir) = matches.get_one::<String>("model_dir") {
            self.model_dir = model_dir.clone();
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
        if let Some(test_size) = matches.get_one::<f64>("test_size") {
            self.test_size = *test_size;
        }
        if let Some(n) = matches.get_one::<usize>("n_estimators") {
            match &mut self.model.model_type {
                ModelType::RandomForest { n_estimators, .. } => *n_estimators = *n,
            }
        }

        validate_tsv_or_csv_file(&self.train_data)?;
        if let Some(consensus) = &self.consensus_fasta {
            validate_fasta_file(consensus)?;
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
