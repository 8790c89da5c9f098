//! Pipeline Orchestrator
//!
//! Runs the per-sample workflow for a whole dataset with bounded concurrency.
//!
//! # Error Handling
//! - Per-sample isolation: a failing sample records a `Failure` outcome and
//!   every other sample carries on
//! - The pipeline itself never fails; its output holds every sample
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(Arc::new(client), config);
//! let results = pipeline.run(samples).await;
//! ```

use crate::service::AssistantService;
use crate::types::{IdentificationResult, Outcome, Sample};
use crate::workflow::identify_sample;
use futures::stream::{self, StreamExt};
use phyto_common::config::AssistantConfig;
use phyto_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Sample name → outcome, for every sample of a run
pub type ResultMap = BTreeMap<String, Outcome>;

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Remote agent the runs are started against
    pub assistant_id: String,
    /// Text posted with the photos
    pub instruction: String,
    /// Purpose attached to uploaded files
    pub upload_purpose: String,
    /// Fixed delay between run status polls
    pub poll_interval: Duration,
    /// Samples in flight at once (at least 1)
    pub max_concurrent_samples: usize,
}

impl PipelineConfig {
    /// Build from the `[assistant]` config section
    ///
    /// Fails when no assistant id is configured.
    pub fn from_assistant_config(config: &AssistantConfig) -> Result<Self> {
        let assistant_id = config
            .assistant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "assistant.assistant_id is not set (config file or --assistant-id)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            assistant_id: assistant_id.to_string(),
            instruction: config.instruction.clone(),
            upload_purpose: config.upload_purpose.clone(),
            poll_interval: config.poll_interval(),
            max_concurrent_samples: config.max_concurrent_samples.max(1),
        })
    }
}

/// Progress events emitted while a run is in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Sample workflow started
    SampleStarted {
        sample: String,
        /// Unix timestamp (seconds since epoch)
        timestamp: i64,
    },

    /// Sample workflow finished, successfully or not
    SampleCompleted {
        sample: String,
        succeeded: bool,
        /// Samples finished so far, this one included
        completed: usize,
        total: usize,
        /// Unix timestamp (seconds since epoch)
        timestamp: i64,
    },
}

/// Identification pipeline
pub struct Pipeline {
    service: Arc<dyn AssistantService>,
    config: PipelineConfig,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Pipeline {
    pub fn new(service: Arc<dyn AssistantService>, config: PipelineConfig) -> Self {
        Self {
            service,
            config,
            event_tx: None,
        }
    }

    /// Create pipeline with event channel for progress reporting
    pub fn with_events(
        service: Arc<dyn AssistantService>,
        config: PipelineConfig,
        event_tx: mpsc::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            service,
            config,
            event_tx: Some(event_tx),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Identify every sample, returning one outcome per sample name
    ///
    /// Up to `max_concurrent_samples` workflows are in flight at once; a
    /// workflow waiting on a poll interval does not hold up the others.
    pub async fn run(&self, samples: Vec<Sample>) -> ResultMap {
        let total = samples.len();
        let workers = self.config.max_concurrent_samples.max(1);
        info!(samples = total, workers, "Identification pipeline starting");

        let completed = AtomicUsize::new(0);

        let results: Vec<IdentificationResult> = stream::iter(samples)
            .map(|sample| {
                let completed = &completed;
                async move {
                    self.emit_event(PipelineEvent::SampleStarted {
                        sample: sample.name.clone(),
                        timestamp: chrono::Utc::now().timestamp(),
                    })
                    .await;

                    let result = identify_sample(self.service.as_ref(), &self.config, &sample).await;

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(
                        sample = %result.sample_name,
                        succeeded = result.outcome.is_success(),
                        progress = %format!("{}/{}", done, total),
                        "Sample finished"
                    );

                    self.emit_event(PipelineEvent::SampleCompleted {
                        sample: result.sample_name.clone(),
                        succeeded: result.outcome.is_success(),
                        completed: done,
                        total,
                        timestamp: chrono::Utc::now().timestamp(),
                    })
                    .await;

                    result
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        let mut map = ResultMap::new();
        for result in results {
            if map.contains_key(&result.sample_name) {
                warn!(sample = %result.sample_name, "Duplicate sample name; keeping the later result");
            }
            map.insert(result.sample_name, result.outcome);
        }

        let failed = map.values().filter(|o| !o.is_success()).count();
        info!(
            total,
            succeeded = map.len() - failed,
            failed,
            "Identification pipeline completed"
        );

        map
    }

    async fn emit_event(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_assistant_id() {
        let config = AssistantConfig::default();
        assert!(PipelineConfig::from_assistant_config(&config).is_err());

        let config = AssistantConfig {
            assistant_id: Some("   ".to_string()),
            ..AssistantConfig::default()
        };
        assert!(PipelineConfig::from_assistant_config(&config).is_err());
    }

    #[test]
    fn test_config_from_assistant_section() {
        let config = AssistantConfig {
            assistant_id: Some("asst_abc".to_string()),
            poll_interval_ms: 250,
            max_concurrent_samples: 0,
            ..AssistantConfig::default()
        };

        let pipeline_config = PipelineConfig::from_assistant_config(&config).unwrap();
        assert_eq!(pipeline_config.assistant_id, "asst_abc");
        assert_eq!(pipeline_config.poll_interval, Duration::from_millis(250));
        assert_eq!(pipeline_config.max_concurrent_samples, 1);
        assert_eq!(
            pipeline_config.instruction,
            "Please identify this plant from these three photos."
        );
    }
}
