//! Error taxonomy for the fetch and dashboard pipelines.
//!
//! Date parse failures are not represented here: the dashboard filter
//! treats an unparseable review date as a local exclusion, never an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    /// Missing or placeholder credentials, or an invalid config value.
    /// Fatal; nothing is written.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The search API reported an error or the transport failed.
    /// Fatal for the run; no partial snapshot is persisted.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The classified snapshot is not available yet.
    #[error("Classified data unavailable: {0}")]
    DataUnavailable(String),

    /// The external classifier command failed or produced no output.
    #[error("Classifier failed: {0}")]
    Classifier(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PulseError {
    fn from(err: reqwest::Error) -> Self {
        PulseError::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
