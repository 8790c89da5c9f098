//! Core types for the identification workflow

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Every sample must carry exactly this many photos
pub const PHOTOS_PER_SAMPLE: usize = 3;

/// One photo of a sample
#[derive(Debug, Clone)]
pub enum Photo {
    /// Photo on disk, read when it is uploaded
    File(PathBuf),
    /// Photo already held in memory
    Memory { file_name: String, bytes: Vec<u8> },
}

impl Photo {
    /// File name sent with the upload
    pub fn file_name(&self) -> String {
        match self {
            Photo::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            Photo::Memory { file_name, .. } => file_name.clone(),
        }
    }

    /// Photo content
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Photo::File(path) => tokio::fs::read(path).await,
            Photo::Memory { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

/// One subject to identify
#[derive(Debug, Clone)]
pub struct Sample {
    /// Unique name, taken from the source folder
    pub name: String,
    /// Photos in upload order
    pub photos: Vec<Photo>,
}

impl Sample {
    pub fn new(name: impl Into<String>, photos: Vec<Photo>) -> Self {
        Self {
            name: name.into(),
            photos,
        }
    }
}

/// Remote session state owned by a single sample's workflow
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub conversation_id: String,
    /// One id per photo, same order as the photos
    pub uploaded_file_ids: Vec<String>,
    pub run_id: Option<String>,
}

/// Status of a remote run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Statuses that end polling
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final state of one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The workflow ran to the end. `answer` is `None` when the conversation
    /// held no message. `run_status` is the terminal status the run reached,
    /// which is not necessarily `completed`.
    Success {
        answer: Option<String>,
        run_status: RunStatus,
    },
    /// The workflow stopped early; the text names the cause
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Value stored in the results artifact
    pub fn artifact_value(&self) -> Option<String> {
        match self {
            Outcome::Success { answer, .. } => answer.clone(),
            Outcome::Failure(reason) => Some(reason.clone()),
        }
    }
}

/// Outcome of one sample, keyed by its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationResult {
    pub sample_name: String,
    pub outcome: Outcome,
}
