use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::FeatureError;
use crate::residue::{encode, Representation, UNRESOLVED_RESIDUE};

/// A validated amino-acid sequence.
///
/// Whitespace is stripped and letters are upper-cased on construction, so a
/// sequence pasted from a FASTA record or a web form can be passed as-is.
/// Empty sequences and sequences containing `X` are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    residues: String,
}

impl Sequence {
    pub fn new(raw: &str) -> Result<Self, FeatureError> {
        let residues: String = raw
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if residues.is_empty() {
            return Err(FeatureError::InvalidSequence("sequence is empty".to_string()));
        }
        if let Some(pos) = residues.find(UNRESOLVED_RESIDUE) {
            return Err(FeatureError::InvalidSequence(format!(
                "unresolved residue 'X' at position {}",
                pos + 1
            )));
        }

        Ok(Sequence { residues })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.residues
    }

    pub fn residues(&self) -> impl Iterator<Item = char> + '_ {
        self.residues.chars()
    }
}

impl FromStr for Sequence {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sequence::new(s)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.residues)
    }
}

/// One scalar per residue position.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericVector {
    values: Vec<f64>,
}

impl NumericVector {
    pub fn new(values: Vec<f64>) -> Self {
        NumericVector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl From<Vec<f64>> for NumericVector {
    fn from(values: Vec<f64>) -> Self {
        NumericVector::new(values)
    }
}

impl Index<usize> for NumericVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

/// Encode every residue of `sequence`, preserving order and length.
pub fn vectorize(
    sequence: &Sequence,
    representation: Representation,
) -> Result<NumericVector, FeatureError> {
    let values = sequence
        .residues()
        .enumerate()
        .map(|(pos, residue)| {
            encode(residue, representation).map_err(|e| {
                log::trace!("Failed to encode residue {:?} at position {}: {}", residue, pos + 1, e);
                e
            })
        })
        .collect::<Result<Vec<f64>, FeatureError>>()?;

    Ok(NumericVector::new(values))
}

/// Validate a raw string and vectorize it.
pub fn vectorize_str(
    raw: &str,
    representation: Representation,
) -> Result<NumericVector, FeatureError> {
    let sequence = Sequence::new(raw)?;
    vectorize(&sequence, representation)
}
