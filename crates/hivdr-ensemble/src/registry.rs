//! The ordered set of drugs a deployment predicts for.
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use hivdr_features::ProteinFamily;
use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;

const PROTEASE_INHIBITORS: &[&str] = &["FPV", "ATV", "IDV", "LPV", "NFV", "SQV", "TPV", "DRV"];
const NNRT_INHIBITORS: &[&str] = &["EFV", "NVP", "ETR", "RPV"];
const NRT_INHIBITORS: &[&str] = &["3TC", "ABC", "AZT", "D4T", "DDI", "TDF"];

/// Drug class, which also fixes the protein region the drugs act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DrugClass {
    #[default]
    Protease,
    Nnrti,
    Nrti,
}

impl DrugClass {
    pub fn default_drugs(&self) -> &'static [&'static str] {
        match self {
            DrugClass::Protease => PROTEASE_INHIBITORS,
            DrugClass::Nnrti => NNRT_INHIBITORS,
            DrugClass::Nrti => NRT_INHIBITORS,
        }
    }

    pub fn protein_family(&self) -> ProteinFamily {
        match self {
            DrugClass::Protease => ProteinFamily::Protease,
            DrugClass::Nnrti | DrugClass::Nrti => ProteinFamily::ReverseTranscriptase,
        }
    }
}

impl fmt::Display for DrugClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrugClass::Protease => "protease",
            DrugClass::Nnrti => "nnrti",
            DrugClass::Nrti => "nrti",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DrugClass {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protease" | "pi" => Ok(DrugClass::Protease),
            "nnrti" | "nnrt" => Ok(DrugClass::Nnrti),
            "nrti" | "nrt" => Ok(DrugClass::Nrti),
            other => Err(EnsembleError::InvalidRegistry(format!(
                "unknown drug class '{}', expected one of: protease, nnrti, nrti",
                other
            ))),
        }
    }
}

/// Ordered, duplicate-free list of drug identifiers.
///
/// Identifiers are trimmed and upper-cased so `"fpv"` and `"FPV"` name the
/// same model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRegistry {
    drugs: Vec<String>,
}

impl DrugRegistry {
    pub fn new<S: AsRef<str>>(drugs: &[S]) -> Result<Self, EnsembleError> {
        if drugs.is_empty() {
            return Err(EnsembleError::InvalidRegistry(
                "at least one drug is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(drugs.len());
        for drug in drugs {
            let id = drug.as_ref().trim().to_uppercase();
            if id.is_empty() {
                return Err(EnsembleError::InvalidRegistry(
                    "drug identifiers must not be empty".to_string(),
                ));
            }
            if !seen.insert(id.clone()) {
                return Err(EnsembleError::InvalidRegistry(format!(
                    "drug '{}' is listed more than once",
                    id
                )));
            }
            normalized.push(id);
        }

        Ok(DrugRegistry { drugs: normalized })
    }

    pub fn for_class(class: DrugClass) -> Self {
        DrugRegistry {
            drugs: class.default_drugs().iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    pub fn contains(&self, drug: &str) -> bool {
        self.drugs.iter().any(|d| d == drug)
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.drugs.iter()
    }
}
