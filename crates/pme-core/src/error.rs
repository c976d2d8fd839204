//! Error types for PME Core
//!
//! Field-level problems in a payload are never errors: they are normalized
//! away with defaults. Only the cases below surface to callers.

use std::path::PathBuf;

/// Request payload could not be turned into a [`crate::RawBusinessInput`]
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Body is not valid JSON
    #[error("malformed JSON body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Body is valid JSON but not an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Unexpected failure inside the calculator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticError {
    /// A derived metric is NaN
    #[error("metric `{metric}` is not a number")]
    NotANumber {
        /// Name of the offending metric
        metric: &'static str,
    },
}

/// Benchmark dataset loading errors
#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    /// Dataset file could not be read
    #[error("failed to read benchmark dataset {path}: {source}")]
    Io {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not a JSON array of entries
    #[error("invalid benchmark dataset: {0}")]
    Parse(#[from] serde_json::Error),
}
