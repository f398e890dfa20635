use crate::morse::MorseError;
use thiserror::Error;

/// Invalid parameters for a constraint. Nothing is added to any group when
/// construction fails.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("length must be positive")]
    ZeroLength,
    #[error("positions are 1-indexed and must be positive")]
    ZeroPosition,
    #[error("positions are equal ({0}), nothing to compare")]
    EqualPositions(usize),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
    #[error(transparent)]
    Morse(#[from] MorseError),
}

/// A structural mutation that cannot be applied to the current state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no filter with index {0}")]
    NoSuchConstraint(usize),
    #[error("no group with index {0}")]
    NoSuchGroup(usize),
    #[error("no dictionary with index {0}")]
    NoSuchDictionary(usize),
    #[error("'{0}' is an exact filter and cannot be matched fuzzily")]
    ExactConstraint(String),
    #[error("could not write {path}: {message}")]
    Save { path: String, message: String },
}

/// A menu line that cannot be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized input: {0}")]
    Unrecognized(String),
    #[error("invalid input: '{0}' is not a number")]
    NotANumber(String),
    #[error("no filter kind {0}")]
    NoSuchRecipe(usize),
}
