//! Command-line front end for bulk listing price prediction.
//!
//! Reads listing URLs (one per line) from a file or stdin, predicts each one
//! through the backend with bounded concurrency and prints the results.

mod config;
mod render;
mod runner;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use batch_logging::{LevelFilter, LogDestination};
use clap::{Parser, Subcommand};
use pricebatch_core::{detect_platform, is_valid_url, normalize, Platform, MAX_URLS};
use pricebatch_engine::EngineHandle;

use crate::config::CliConfig;
use crate::runner::BatchRunner;

#[derive(Parser)]
#[command(name = "pricebatch")]
#[command(version, about = "Predict prices for a batch of car listing URLs", long_about = None)]
struct Cli {
    /// Also write logs to ./pricebatch.log
    #[arg(long, global = true)]
    log_file: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict every URL in the input
    Run {
        /// File with one URL per line (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// RON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend base URL, overrides the config file
        #[arg(long)]
        api_url: Option<String>,

        /// Directory for the JSON export, overrides the config file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip writing the JSON export
        #[arg(long)]
        no_export: bool,
    },

    /// Show which URLs would be accepted, without calling the backend
    Check {
        /// File with one URL per line (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    batch_logging::initialize(destination, level);

    let result = match cli.command {
        Commands::Run {
            input,
            config,
            api_url,
            out,
            no_export,
        } => handle_run(input, config, api_url, out, no_export),
        Commands::Check { input } => handle_check(input),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn handle_run(
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    api_url: Option<String>,
    out: Option<PathBuf>,
    no_export: bool,
) -> anyhow::Result<()> {
    let mut config = CliConfig::load_or_default(config.as_deref())?;
    if let Some(api_url) = api_url {
        config.api_base_url = api_url;
    }
    if let Some(out) = out {
        config.output_dir = out;
    }

    let text = read_input(input.as_deref())?;
    let engine = EngineHandle::new(config.engine_settings())?;
    let output_dir = (!no_export).then(|| config.output_dir.clone());

    let summary = BatchRunner::new(engine).run(text, output_dir)?;
    println!(
        "Done: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    if let Some(path) = summary.export_path {
        println!("Exported results to {}", path.display());
    }
    Ok(())
}

fn handle_check(input: Option<PathBuf>) -> anyhow::Result<()> {
    let text = read_input(input.as_deref())?;
    let normalized = normalize(&text, is_valid_url);

    for url in &normalized.urls {
        match detect_platform(url) {
            Some(platform) => println!("{url} ({})", platform.name()),
            None => println!("{url}"),
        }
    }
    println!(
        "{} accepted, {} invalid, {} duplicate, {} over the limit of {}",
        normalized.urls.len(),
        normalized.dropped_invalid,
        normalized.dropped_duplicates,
        normalized.dropped_over_cap,
        MAX_URLS
    );
    if normalized.urls.is_empty() {
        println!("Supported listing sites:");
        for platform in Platform::ALL {
            println!("  {:<9} {}", platform.name(), platform.example_url());
        }
        anyhow::bail!("please enter at least one valid URL");
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
