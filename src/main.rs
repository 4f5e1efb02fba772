//! seq-dispatch - Classify sequencing reads against a precomputed index
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use seq_dispatch::config::{CliArgs, RunConfig};
use seq_dispatch::progress::{print_header, print_summary, ProgressReporter};
use seq_dispatch::{NullClassifier, Pipeline};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose, args.debug);

    // Validate and create config
    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    debug!(
        min_fragment_length = config.params.min_fragment_length,
        min_score = config.params.min_score,
        mismatches = config.params.mismatches,
        seed_length = config.params.seed_length,
        mode = %config.params.mode,
        input = %config.input_path.display(),
        mate_input = ?config.mate_path,
        paired = config.is_paired(),
        "Parameters"
    );

    let show_progress = config.show_progress;
    let threads = config.worker_count;
    let inputs: Vec<String> = config
        .input_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let mut pipeline = Pipeline::from_config(config, Arc::new(NullClassifier))
        .context("Failed to initialize pipeline")?;
    let output = pipeline.context().sink().description().to_string();

    if show_progress {
        let index = pipeline.context().index();
        print_header(
            &index.path().display().to_string(),
            index.len() as u64,
            &inputs,
            threads,
            &output,
        );
        pipeline = pipeline.with_progress(ProgressReporter::new());
    }

    let summary = pipeline.run().context("Classification run failed")?;

    if show_progress {
        print_summary(&summary, &output);
    }

    if summary.failed > 0 {
        info!(failed = summary.failed, "Run completed with per-read failures");
    }

    Ok(())
}

fn setup_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("seq_dispatch=debug,warn")
    } else if verbose {
        EnvFilter::new("seq_dispatch=info,warn")
    } else {
        EnvFilter::new("seq_dispatch=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
