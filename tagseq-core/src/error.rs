//! Structured error types for the tagseq crates.

use thiserror::Error;

/// Unified error type for all tagseq operations.
///
/// Every variant represents a precondition violation detected before any
/// computation begins; callers never observe partially constructed results.
#[derive(Debug, Error)]
pub enum TagseqError {
    /// A tuning parameter is outside its valid range (e.g. a smoothing
    /// constant that is not strictly positive).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Array or matrix dimensions do not agree (lengths not summing to the
    /// sample count, feature counts differing between fit and decode, etc.)
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An operation received no data to work on.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A sparse observation references a feature index outside the declared
    /// feature space.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the tagseq crates.
pub type Result<T> = std::result::Result<T, TagseqError>;
