//! Error types for phyto-score

use thiserror::Error;

/// Taxonomy lookup errors (scoped to one name)
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A record whose inner payload is not a JSON object
#[derive(Debug, Error)]
#[error("Malformed record '{key}': {reason}")]
pub struct MalformedRecordError {
    /// Outer key of the offending entry
    pub key: String,
    pub reason: String,
}

/// Tabular and record file errors
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required name column is absent from the table header
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The outer JSON document is not an object
    #[error("Invalid record envelope: {0}")]
    Envelope(String),

    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
}
