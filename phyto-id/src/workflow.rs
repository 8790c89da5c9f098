//! Per-sample identification workflow
//!
//! Stages run strictly in order for one sample:
//! 1. Validate photo count (no network on failure)
//! 2. Upload photos
//! 3. Open conversation
//! 4. Post the identification request
//! 5. Start a run and poll it to a terminal status
//! 6. Fetch the newest message
//!
//! Any error is captured into `Outcome::Failure`; nothing escapes the sample.

use crate::error::{IdentifyError, ServiceError};
use crate::pipeline::PipelineConfig;
use crate::service::AssistantService;
use crate::types::{
    Conversation, IdentificationResult, Outcome, RunStatus, Sample, PHOTOS_PER_SAMPLE,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the full workflow for one sample
pub async fn identify_sample(
    service: &dyn AssistantService,
    config: &PipelineConfig,
    sample: &Sample,
) -> IdentificationResult {
    let outcome = match run_workflow(service, config, sample).await {
        Ok((answer, run_status)) => {
            if run_status != RunStatus::Completed {
                warn!(
                    sample = %sample.name,
                    status = %run_status,
                    "Run ended without completing; answer fetched anyway"
                );
            }
            Outcome::Success { answer, run_status }
        }
        Err(e) => {
            warn!(sample = %sample.name, error = %e, "Identification failed");
            Outcome::Failure(e.to_string())
        }
    };

    IdentificationResult {
        sample_name: sample.name.clone(),
        outcome,
    }
}

async fn run_workflow(
    service: &dyn AssistantService,
    config: &PipelineConfig,
    sample: &Sample,
) -> Result<(Option<String>, RunStatus), IdentifyError> {
    validate(sample)?;

    let file_ids = upload_photos(service, config, sample).await?;

    let mut conversation = Conversation {
        uploaded_file_ids: file_ids,
        ..Conversation::default()
    };

    converse(service, config, sample, &mut conversation)
        .await
        .map_err(IdentifyError::Workflow)
}

fn validate(sample: &Sample) -> Result<(), IdentifyError> {
    if sample.photos.len() != PHOTOS_PER_SAMPLE {
        return Err(IdentifyError::Validation {
            expected: PHOTOS_PER_SAMPLE,
            found: sample.photos.len(),
        });
    }
    Ok(())
}

/// Upload photos in order; the first failure aborts the sample
///
/// Files already uploaded for the sample are left on the service.
async fn upload_photos(
    service: &dyn AssistantService,
    config: &PipelineConfig,
    sample: &Sample,
) -> Result<Vec<String>, IdentifyError> {
    let mut file_ids = Vec::with_capacity(sample.photos.len());

    for photo in &sample.photos {
        let file_name = photo.file_name();
        let bytes = photo
            .read()
            .await
            .map_err(|e| IdentifyError::Upload(ServiceError::Io(e)))?;

        let file_id = service
            .upload_file(&file_name, bytes, &config.upload_purpose)
            .await
            .map_err(IdentifyError::Upload)?;

        debug!(sample = %sample.name, file = %file_name, file_id = %file_id, "Uploaded photo");
        file_ids.push(file_id);
    }

    Ok(file_ids)
}

async fn converse(
    service: &dyn AssistantService,
    config: &PipelineConfig,
    sample: &Sample,
    conversation: &mut Conversation,
) -> Result<(Option<String>, RunStatus), ServiceError> {
    let conversation_id = service.create_conversation().await?;
    conversation.conversation_id = conversation_id.clone();
    debug!(sample = %sample.name, conversation = %conversation_id, "Conversation opened");

    service
        .post_message(
            &conversation_id,
            &config.instruction,
            &conversation.uploaded_file_ids,
        )
        .await?;

    let run_id = service
        .start_run(&conversation_id, &config.assistant_id)
        .await?;
    conversation.run_id = Some(run_id.clone());
    debug!(sample = %sample.name, run = %run_id, "Run started");

    let status =
        poll_until_terminal(service, &conversation_id, &run_id, config.poll_interval).await?;
    info!(sample = %sample.name, status = %status, "Run reached terminal status");

    let answer = service.latest_message(&conversation_id).await?;

    Ok((answer, status))
}

/// Poll a run at a fixed interval until its status is terminal
///
/// There is no upper bound on the number of polls.
pub async fn poll_until_terminal(
    service: &dyn AssistantService,
    conversation_id: &str,
    run_id: &str,
    interval: Duration,
) -> Result<RunStatus, ServiceError> {
    loop {
        let status = service.run_status(conversation_id, run_id).await?;
        if status.is_terminal() {
            return Ok(status);
        }
        debug!(run = %run_id, status = %status, "Run still pending");
        tokio::time::sleep(interval).await;
    }
}
