//! Model persistence and the process-wide model cache.
//!
//! Artifacts live at `<root>/<DRUG>/<DRUG>.json`, one per drug. A
//! [`ModelCache`] is filled once at startup from a [`ModelStore`] and is
//! read-only afterwards.
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hivdr_features::FeatureSpec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;
use crate::models::{EnsembleModel, TrainedModel};
use crate::registry::DrugRegistry;

/// Source of trained per-drug models.
pub trait ModelStore: Send + Sync {
    /// Load the model for `drug`, failing with
    /// [`EnsembleError::ModelNotFound`] when none exists.
    fn load(&self, drug: &str) -> Result<Arc<dyn EnsembleModel>, EnsembleError>;
}

/// A trained model together with the metadata needed to use it safely.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub drug: String,
    pub features: FeatureSpec,
    pub n_training_samples: usize,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn new(
        drug: impl Into<String>,
        features: FeatureSpec,
        n_training_samples: usize,
        model: TrainedModel,
    ) -> Self {
        ModelArtifact {
            version: env!("CARGO_PKG_VERSION").to_string(),
            drug: drug.into(),
            features,
            n_training_samples,
            model,
        }
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EnsembleError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EnsembleError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Filesystem-backed store rooted at a model directory.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    root: PathBuf,
    features: FeatureSpec,
}

impl FileModelStore {
    /// `features` is what the caller will featurize with; artifacts
    /// trained with a different spec are refused on load.
    pub fn new(root: impl Into<PathBuf>, features: FeatureSpec) -> Self {
        FileModelStore {
            root: root.into(),
            features,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, drug: &str) -> PathBuf {
        self.root.join(drug).join(format!("{}.json", drug))
    }

    /// Write `artifact` to its conventional location, creating directories.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<PathBuf, EnsembleError> {
        let path = self.artifact_path(&artifact.drug);
        if let Some(parent) = path.parent() {
            if parent.exists() {
                log::debug!("{} exists, overwriting artifact", parent.display());
            }
            fs::create_dir_all(parent)?;
        }
        artifact.to_file(&path)?;
        log::info!("Wrote model for {} to {}", artifact.drug, path.display());
        Ok(path)
    }

    pub fn load_artifact(&self, drug: &str) -> Result<ModelArtifact, EnsembleError> {
        let path = self.artifact_path(drug);
        if !path.is_file() {
            log::debug!("No artifact for {} at {}", drug, path.display());
            return Err(EnsembleError::ModelNotFound(drug.to_string()));
        }
        ModelArtifact::from_file(&path)
    }
}

impl ModelStore for FileModelStore {
    fn load(&self, drug: &str) -> Result<Arc<dyn EnsembleModel>, EnsembleError> {
        let artifact = self.load_artifact(drug)?;

        if artifact.features != self.features {
            return Err(EnsembleError::IncompatibleArtifact {
                drug: drug.to_string(),
                expected: self.features,
                found: artifact.features,
            });
        }
        if artifact.drug != drug {
            log::warn!(
                "Artifact at {} is labelled '{}' but was loaded for '{}'",
                self.artifact_path(drug).display(),
                artifact.drug,
                drug
            );
        }

        log::debug!(
            "Loaded {} model for {} ({} members, trained on {} samples)",
            artifact.model.name(),
            drug,
            artifact.model.n_members(),
            artifact.n_training_samples
        );
        Ok(Arc::new(artifact.model))
    }
}

/// Store holding already constructed models, e.g. for tests or embedding.
#[derive(Default, Clone)]
pub struct InMemoryModelStore {
    models: HashMap<String, Arc<dyn EnsembleModel>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, drug: impl Into<String>, model: Arc<dyn EnsembleModel>) {
        self.models.insert(drug.into(), model);
    }
}

impl ModelStore for InMemoryModelStore {
    fn load(&self, drug: &str) -> Result<Arc<dyn EnsembleModel>, EnsembleError> {
        self.models
            .get(drug)
            .cloned()
            .ok_or_else(|| EnsembleError::ModelNotFound(drug.to_string()))
    }
}

/// Read-only `drug -> model` mapping shared across requests.
#[derive(Default, Clone)]
pub struct ModelCache {
    models: HashMap<String, Arc<dyn EnsembleModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every drug in `registry` from `store`, in parallel.
    ///
    /// Fails on the first drug that cannot be loaded; no partial cache is
    /// returned.
    pub fn preload(store: &dyn ModelStore, registry: &DrugRegistry) -> Result<Self, EnsembleError> {
        let start_time = std::time::Instant::now();
        let loaded = registry
            .drugs()
            .par_iter()
            .map(|drug| {
                log::info!("Loading model for drug {}", drug);
                store.load(drug).map(|model| (drug.clone(), model))
            })
            .collect::<Result<Vec<_>, EnsembleError>>()?;

        log::info!(
            "Loaded {} models in {:?}",
            loaded.len(),
            start_time.elapsed()
        );
        Ok(loaded.into_iter().collect())
    }

    pub fn insert(&mut self, drug: impl Into<String>, model: Arc<dyn EnsembleModel>) {
        self.models.insert(drug.into(), model);
    }

    pub fn get(&self, drug: &str) -> Option<&Arc<dyn EnsembleModel>> {
        self.models.get(drug)
    }

    pub fn contains(&self, drug: &str) -> bool {
        self.models.contains_key(drug)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<(String, Arc<dyn EnsembleModel>)> for ModelCache {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn EnsembleModel>)>>(iter: I) -> Self {
        ModelCache {
            models: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut drugs: Vec<&String> = self.models.keys().collect();
        drugs.sort();
        f.debug_struct("ModelCache").field("drugs", &drugs).finish()
    }
}
