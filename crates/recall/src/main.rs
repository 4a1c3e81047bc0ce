// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall - memory build orchestrator.
//!
//! This is the binary entry point: configuration checks and request replay.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod replay;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recall_config::RecallConfig;
use recall_core::RecallError;
use tracing::error;

/// Recall - memory build orchestrator.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration and print the provider registry.
    Check,
    /// Replay newline-delimited resources requests and print the responses.
    Replay {
        /// JSONL file with one resources payload per line.
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => recall_config::load_and_validate_path(path),
        None => recall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);
    recall_memory::recording::register_metrics();

    let result = match cli.command {
        Commands::Check => check(&config),
        Commands::Replay { input } => replay::run(&config, &input).await,
    };

    if let Err(e) = result {
        error!(error = %e, "recall failed");
        eprintln!("recall: {e}");
        std::process::exit(1);
    }
}

fn check(config: &RecallConfig) -> Result<(), RecallError> {
    let registry = recall_memory::registry_from_config(&config.providers)?;
    println!(
        "recall: config ok ({} providers, max_background_tasks={})",
        registry.len(),
        config.orchestrator.max_background_tasks
    );
    for (position, descriptor) in registry.iter().enumerate() {
        println!("  {}. {} ({})", position + 1, descriptor.name(), descriptor.mode());
    }
    Ok(())
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recall={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
