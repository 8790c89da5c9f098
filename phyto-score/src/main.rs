//! phyto-score - Lineage distance scoring
//!
//! Usage: phyto-score <command>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phyto_common::config::load_config;
use phyto_common::logging::init_tracing;
use phyto_score::gbif_client::GbifClient;
use phyto_score::records::{join_records, read_records, write_records};
use phyto_score::table::{read_rows, write_scored};
use phyto_score::Scorer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "phyto-score")]
#[command(about = "Score plant identification guesses by taxonomic distance")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/phyto/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add Distance_1..3 columns to a guesses table and print a summary
    Distances {
        /// CSV with Correct Answer, Guess 1, Guess 2, Guess 3 columns
        #[arg(short, long)]
        input: PathBuf,

        /// Scored CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Join an answer sheet with identification results into one CSV
    Join {
        /// Answer sheet JSON (sample → stringified record)
        #[arg(long)]
        answers: PathBuf,

        /// Results JSON (sample → stringified record)
        #[arg(long)]
        results: PathBuf,

        /// Joined CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_handle = init_tracing()?;

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    config.validate()?;
    log_handle.apply(&config.logging)?;

    match cli.command {
        Command::Distances { input, output } => {
            info!("Scoring {}", input.display());

            let table = read_rows(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let client = GbifClient::from_config(&config.taxonomy)
                .context("Failed to create GBIF client")?;
            let scorer = Scorer::new(Arc::new(client), config.taxonomy.pacing());
            let report = scorer.score(table.rows).await;

            write_scored(&output, &table.headers, &report.rows)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("{}", report.summary);
            println!(
                "Resolved {} of {} distinct names; scored table written to {}",
                report.names_resolved,
                report.names_looked_up,
                output.display()
            );
        }
        Command::Join {
            answers,
            results,
            output,
        } => {
            let answer_sheet = read_records(&answers)
                .with_context(|| format!("Failed to read {}", answers.display()))?;
            let identified = read_records(&results)
                .with_context(|| format!("Failed to read {}", results.display()))?;

            let joined = join_records(&answer_sheet, &identified);
            write_records(&output, &joined)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("{} joined records written to {}", joined.len(), output.display());
        }
    }

    Ok(())
}
