//! Error types for phyto-id
//!
//! `IdentifyError` renders the failure text recorded for a sample, so its
//! `Display` output is part of the results artifact.

use thiserror::Error;

/// Assistant service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-sample workflow failure
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Wrong photo count, nothing was sent to the service
    #[error("Expected {expected} images, found {found}")]
    Validation { expected: usize, found: usize },

    /// A photo could not be read or uploaded
    #[error("Error uploading image: {0}")]
    Upload(#[source] ServiceError),

    /// Conversation, message, run or answer retrieval failed
    #[error("Error: {0}")]
    Workflow(#[source] ServiceError),
}
