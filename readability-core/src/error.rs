//! Error taxonomy for parsing, scoring, and metric extraction
//!
//! A `rate` pass is all-or-nothing: any scoring or metrics failure for any
//! method aborts the whole call. Retries are the caller's concern.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadabilityError {
    /// The syntax provider could not produce a tree; no scope tree is ever
    /// constructed without one.
    #[error("failed to parse {file}: {reason}")]
    ParseUnavailable { file: PathBuf, reason: String },

    /// The scoring engine could not be located or set up.
    #[error("scoring engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Engine spawn error, non-zero exit, or unparsable score output.
    #[error("scoring failed for {snippet}: {reason}")]
    Scoring { snippet: PathBuf, reason: String },

    /// Scoring succeeded but metric extraction failed. Kept distinct from
    /// `Scoring`; the rating pass still fails the whole call on either.
    #[error("metrics extraction failed for {snippet}: {reason}")]
    Metrics { snippet: PathBuf, reason: String },

    /// Improvement ranking was asked for a score result without metrics.
    #[error("improvement ranking requires metrics, but the score result carries none")]
    MissingMetrics,

    /// The per-call worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}
