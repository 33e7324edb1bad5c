// SPDX-License-Identifier: Apache-2.0

//! gcfbench CLI
//!
//! Command-line interface for the serverless cold-start benchmark harness.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod gcloud;
mod prober;

/// gcfbench - Cold-start benchmark harness for serverless functions
#[derive(Parser)]
#[command(name = "gcfbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file path
    #[arg(short, long, default_value = "gcfbench.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy the configured instances, probe them, and record results
    Run {
        /// Override the configured concurrency limit
        #[arg(long)]
        concurrency: Option<usize>,

        /// Deploy only; skip the request probes
        #[arg(long)]
        no_probe: bool,
    },

    /// Render a saved results artifact as a report
    View {
        /// Results directory (defaults to the configured one)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Artifact filename (defaults to the configured one)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Validate a run configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            concurrency,
            no_probe,
        } => commands::run::execute(&cli.config, concurrency, no_probe).await,
        Commands::View { dir, file } => commands::view::execute(&cli.config, dir, file).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
