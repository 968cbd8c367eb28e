use thiserror::Error;

/// Errors raised while turning a sequence into features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Empty input, or a sequence containing the unresolved code `X`.
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Unknown residue '{0}'")]
    UnknownResidue(char),

    /// `X` reached the encoder; sequences must be screened before encoding.
    #[error("Ambiguous residue 'X' cannot be encoded")]
    AmbiguousResidue,

    #[error("Cannot interpolate a vector of {0} point(s), at least 2 are required")]
    DegenerateVector(usize),

    #[error("Target length must be at least 1")]
    InvalidTargetLength,

    #[error("Unknown representation: {0}. Expected one of: mw, pka")]
    UnknownRepresentation(String),

    #[error("Unknown protein family: {0}. Expected one of: protease, rt")]
    UnknownProteinFamily(String),
}
