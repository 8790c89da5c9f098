//! phyto-id - Plant identification runner
//!
//! Sends every sample folder of a dataset to the identification assistant
//! and writes the answers to a JSON file keyed by sample name.

use anyhow::{Context, Result};
use clap::Parser;
use phyto_common::config::{load_config, resolve_api_key};
use phyto_common::logging::init_tracing;
use phyto_id::assistant_client::AssistantClient;
use phyto_id::dataset::{scan_dataset, DatasetOptions};
use phyto_id::results::write_results;
use phyto_id::{Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line arguments for phyto-id
#[derive(Parser, Debug)]
#[command(name = "phyto-id")]
#[command(about = "Identify plant photo samples with a remote assistant")]
#[command(version)]
struct Args {
    /// Dataset directory (one folder of photos per sample)
    #[arg(short, long, env = "PHYTO_DATASET")]
    dataset: PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "plant_id_results.json")]
    output: PathBuf,

    /// Config file (defaults to ~/.config/phyto/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum samples processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Assistant id (overrides the config file)
    #[arg(long, env = "PHYTO_ASSISTANT_ID")]
    assistant_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_handle = init_tracing()?;
    info!("Starting phyto-id {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.as_deref()).context("Failed to load config")?;
    if let Some(concurrency) = args.concurrency {
        config.assistant.max_concurrent_samples = concurrency;
    }
    if let Some(assistant_id) = args.assistant_id {
        config.assistant.assistant_id = Some(assistant_id);
    }
    config.validate()?;
    log_handle.apply(&config.logging)?;

    info!("Dataset: {}", args.dataset.display());

    let pipeline_config = PipelineConfig::from_assistant_config(&config.assistant)?;
    let api_key = resolve_api_key(&config.assistant)?;
    let client = AssistantClient::from_config(&config.assistant, api_key)
        .context("Failed to create assistant client")?;

    let samples = scan_dataset(&args.dataset, &DatasetOptions::from(&config.assistant))
        .context("Failed to scan dataset")?;
    info!("Found {} samples", samples.len());

    let pipeline = Pipeline::new(Arc::new(client), pipeline_config);
    info!(
        assistant = %pipeline.config().assistant_id,
        poll_interval = ?pipeline.config().poll_interval,
        max_concurrent = pipeline.config().max_concurrent_samples,
        "Pipeline configured"
    );
    let results = pipeline.run(samples).await;

    write_results(&args.output, &results)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let failed = results.values().filter(|o| !o.is_success()).count();
    println!(
        "Results written to {} ({} samples, {} failed)",
        args.output.display(),
        results.len(),
        failed
    );

    Ok(())
}
