//! Identification service boundary
//!
//! The workflow only talks to the remote assistant through this trait, so
//! tests can drive it with an in-process fake.

use crate::error::ServiceError;
use crate::types::RunStatus;
use async_trait::async_trait;

#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Store a file remotely, returning its file id
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        purpose: &str,
    ) -> Result<String, ServiceError>;

    /// Open an empty conversation, returning its id
    async fn create_conversation(&self) -> Result<String, ServiceError>;

    /// Post a user message with text and file references (in order), returning the message id
    async fn post_message(
        &self,
        conversation_id: &str,
        text: &str,
        file_ids: &[String],
    ) -> Result<String, ServiceError>;

    /// Start the agent against the conversation, returning the run id
    async fn start_run(
        &self,
        conversation_id: &str,
        assistant_id: &str,
    ) -> Result<String, ServiceError>;

    async fn run_status(
        &self,
        conversation_id: &str,
        run_id: &str,
    ) -> Result<RunStatus, ServiceError>;

    /// Text of the newest message, if the conversation has one with text
    async fn latest_message(&self, conversation_id: &str) -> Result<Option<String>, ServiceError>;
}
