//! Residue encoder: single amino-acid letters to physicochemical scalars.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

// Average masses of the free amino acids (Da).
const MOLECULAR_WEIGHT_DICT: &[(char, f64)] = &[
    ('A', 89.0932),
    ('C', 121.1582),
    ('D', 133.1027),
    ('E', 147.1293),
    ('F', 165.1891),
    ('G', 75.0666),
    ('H', 155.1546),
    ('I', 131.1729),
    ('K', 146.1876),
    ('L', 131.1729),
    ('M', 149.2113),
    ('N', 132.1179),
    ('P', 115.1305),
    ('Q', 146.1445),
    ('R', 174.201),
    ('S', 105.0926),
    ('T', 119.1192),
    ('V', 117.1463),
    ('W', 204.2252),
    ('Y', 181.1885),
];

const ISOELECTRIC_POINT_DICT: &[(char, f64)] = &[
    ('A', 6.00),
    ('C', 5.07),
    ('D', 2.77),
    ('E', 3.22),
    ('F', 5.48),
    ('G', 5.97),
    ('H', 7.59),
    ('I', 6.02),
    ('K', 9.74),
    ('L', 5.98),
    ('M', 5.74),
    ('N', 5.41),
    ('P', 6.30),
    ('Q', 5.65),
    ('R', 10.76),
    ('S', 5.68),
    ('T', 5.60),
    ('V', 5.96),
    ('W', 5.89),
    ('Y', 5.66),
];

/// The 20 canonical residue codes.
pub const CANONICAL_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Unresolved ambiguity code. Never encodable.
pub const UNRESOLVED_RESIDUE: char = 'X';

/// Which physicochemical property a residue is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Representation {
    #[default]
    #[serde(rename = "mw")]
    MolecularWeight,
    #[serde(rename = "pka")]
    IsoelectricPoint,
}

impl Representation {
    pub fn table(&self) -> &'static ResidueTable {
        match self {
            Representation::MolecularWeight => &MOLECULAR_WEIGHTS,
            Representation::IsoelectricPoint => &ISOELECTRIC_POINTS,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Representation::MolecularWeight => "mw",
            Representation::IsoelectricPoint => "pka",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Representation {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mw" | "molecular_weight" => Ok(Representation::MolecularWeight),
            "pka" | "pi" | "isoelectric_point" => Ok(Representation::IsoelectricPoint),
            other => Err(FeatureError::UnknownRepresentation(other.to_string())),
        }
    }
}

/// Immutable residue → scalar lookup.
///
/// Holds every canonical residue plus the ambiguity codes `B` (mean of `D`
/// and `N`) and `Z` (mean of `E` and `Q`).
#[derive(Debug, Clone)]
pub struct ResidueTable {
    values: HashMap<char, f64>,
}

impl ResidueTable {
    fn from_canonical(entries: &[(char, f64)]) -> Self {
        let mut values: HashMap<char, f64> = entries.iter().copied().collect();
        debug_assert!(CANONICAL_RESIDUES.chars().all(|c| values.contains_key(&c)));

        let b = (values[&'D'] + values[&'N']) / 2.0;
        let z = (values[&'E'] + values[&'Q']) / 2.0;
        values.insert('B', b);
        values.insert('Z', z);

        ResidueTable { values }
    }

    pub fn get(&self, residue: char) -> Option<f64> {
        self.values.get(&residue).copied()
    }

    pub fn contains(&self, residue: char) -> bool {
        self.values.contains_key(&residue)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub static MOLECULAR_WEIGHTS: Lazy<ResidueTable> =
    Lazy::new(|| ResidueTable::from_canonical(MOLECULAR_WEIGHT_DICT));

pub static ISOELECTRIC_POINTS: Lazy<ResidueTable> =
    Lazy::new(|| ResidueTable::from_canonical(ISOELECTRIC_POINT_DICT));

/// Encode a single residue letter.
///
/// Only upper-case codes are recognised; `X` fails with
/// [`FeatureError::AmbiguousResidue`], anything else outside the table with
/// [`FeatureError::UnknownResidue`].
pub fn encode(residue: char, representation: Representation) -> Result<f64, FeatureError> {
    if residue == UNRESOLVED_RESIDUE {
        return Err(FeatureError::AmbiguousResidue);
    }
    representation
        .table()
        .get(residue)
        .ok_or(FeatureError::UnknownResidue(residue))
}
