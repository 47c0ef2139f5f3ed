//! CLI entry point for the sante-dl tool.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sante_dl_core::{DatasetOutcome, FetchConfig, Orchestrator, builtin_datasets};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    if args.list {
        for descriptor in builtin_datasets() {
            println!("  {:25} — {}", descriptor.name, descriptor.description);
        }
        return Ok(());
    }

    let mut config = FetchConfig::from_env();
    if let Some(dir) = args.output_dir {
        config.storage_root = dir;
    }
    if let Some(secs) = args.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if args.no_progress || args.quiet {
        config.progress = false;
    }

    info!(
        storage_root = %config.storage_root.display(),
        api_base = %config.api_base,
        "starting download run"
    );

    let orchestrator = Orchestrator::new(config);
    let selected = (!args.datasets.is_empty()).then_some(args.datasets.as_slice());
    let results = orchestrator.run(selected).await;

    println!();
    println!("{}", "=".repeat(60));
    println!("Download Summary");
    println!("{}", "=".repeat(60));
    for (name, outcome) in &results {
        match outcome {
            DatasetOutcome::Completed { files } => println!("  {name:25} — {files} files"),
            DatasetOutcome::Stub => println!("  {name:25} — STUB (no bulk download)"),
            DatasetOutcome::Failed { .. } => println!("  {name:25} — ERROR"),
        }
    }

    Ok(())
}
