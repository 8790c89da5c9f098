//! phyto-id library interface
//!
//! Drives the remote identification workflow for every sample in a dataset:
//! upload three photos, open a conversation, post the request, poll the run
//! to a terminal status and fetch the answer. Samples run concurrently and a
//! failing sample never affects another one.

pub mod assistant_client;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod results;
pub mod service;
pub mod types;
pub mod workflow;

pub use crate::error::{IdentifyError, ServiceError};
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineEvent};
pub use crate::service::AssistantService;
pub use crate::types::{IdentificationResult, Outcome, Photo, RunStatus, Sample};
