//! Error type shared by the clustering engine and its data containers.

use thiserror::Error;

/// Everything that can go wrong when configuring, fitting or querying a model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KMeansError {
    /// Bad hyperparameters: zero clusters, zero iterations, negative tolerance.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Empty, zero-width, ragged or non-finite input table.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("dimension mismatch: model was fitted on {expected} features, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("model has not been fitted yet, call fit() first")]
    NotFitted,
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;
