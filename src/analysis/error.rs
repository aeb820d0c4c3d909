//! Error types shared by both analysis entry points

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs or running an analysis.
///
/// `NotFound`, `Format`, `Config` and `Data` are fatal validation errors;
/// non-fatal conditions (gap symbols in an input set, an absolute threshold
/// overriding a fractional one) are reported as warnings instead and never
/// surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An input file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// An input file is not made of valid FASTA-like records, or is empty.
    #[error("invalid sequence file '{}': {}", path.display(), reason)]
    Format { path: PathBuf, reason: String },

    /// Conflicting or out-of-range configuration, detected before any file
    /// is read.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An oligo sequence is unusable after normalization.
    #[error("invalid oligo '{id}': {reason}")]
    Data { id: String, reason: String },

    /// The caller's cancellation token was set mid-run.
    #[error("analysis cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
