//! Error types for sweep runs.
//!
//! Absent keys, missing environment blocks and unparsable fixtures are data,
//! not errors; this type covers the failures that stop a run: unreadable
//! inputs the caller insisted on, bad configuration, and output that cannot
//! be written.

use thiserror::Error;

/// Errors that can occur while configuring or running a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid or missing input (e.g. a fixture root that does not exist).
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for results with [`SweepError`].
pub type Result<T> = std::result::Result<T, SweepError>;
