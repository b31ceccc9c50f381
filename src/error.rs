//! Error type shared by the fallible parts of the crate
//!
//! The numeric stages (filtering, quantization, peak detection, resampling)
//! never fail. Errors are reserved for classification over a missing or
//! incomplete training corpus, store mutation, persistence and input validation.

use thiserror::Error;

use crate::direction::DirectionClass;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the PIN inference pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Classification was requested but no class holds any training feature
    #[error("no training data: every direction class is empty")]
    NoTrainingData,

    /// The corpus holds fewer vectors than the neighbourhood size requires
    #[error("insufficient training data: {required} neighbours requested, {available} training features present")]
    InsufficientTrainingData { required: usize, available: usize },

    /// Delete-last was requested on a class with no stored features
    #[error("training store for class {class} is empty")]
    EmptyStore { class: DirectionClass },

    /// A feature vector does not have the dimension of the corpus or query
    #[error("feature size mismatch: expected {expected} values, found {found}")]
    FeatureSizeMismatch { expected: usize, found: usize },

    /// A PIN string that is not exactly four ASCII digits
    #[error("invalid PIN: {0:?}")]
    InvalidPin(String),

    /// A direction label that is not one of the nine classes
    #[error("invalid direction label: {0:?}")]
    InvalidDirection(String),

    /// Settings that would make a pipeline stage ill-defined
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A persisted PIN database that violates its format
    #[error("malformed PIN database: {0}")]
    MalformedDatabase(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
