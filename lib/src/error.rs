//! Error types shared by every stage of the price model.

use crate::dataset::ColumnKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for feature assembly, model fitting and persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Input columns do not match the schema the model was fitted with.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),
    /// Empty data provided where non-empty was required.
    #[error("empty data: {0}")]
    EmptyData(String),
    /// Input values that cannot be used (bad targets, unknown regime, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Feature or learner configuration that is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A model artifact that is corrupted, partial or inconsistent.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The ways a table can disagree with a fitted feature schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    /// A column the schema expects is absent.
    #[error("missing column `{0}`")]
    MissingColumn(String),
    /// A column exists but holds the other kind of values.
    #[error("column `{column}` is not {expected}")]
    WrongKind {
        /// Offending column name.
        column: String,
        /// Kind the schema requires.
        expected: ColumnKind,
    },
    /// Feature dimension mismatch.
    #[error("expected {expected} features, got {got}")]
    FeatureCount {
        /// Width recorded at fit time.
        expected: usize,
        /// Width seen now.
        got: usize,
    },
    /// A persisted model was fitted with another feature configuration.
    #[error("model was fitted with a different feature configuration")]
    Configuration,
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}
