//! seq-dispatch - Streaming read ingestion and parallel classification
//!
//! Reads FASTA or FASTQ records from one or two files, queues them in a
//! bounded work queue and classifies them on a fixed pool of worker threads
//! against a precomputed index.
//!
//! # Features
//!
//! - **Format auto-detection**: `>` selects FASTA, `@` selects FASTQ. Any
//!   other leading byte aborts the run before a worker is started.
//!
//! - **Bounded memory**: The work queue holds at most `--queue-size` reads;
//!   the reader blocks while workers catch up.
//!
//! - **Paired input**: A second file is either queued after the first or,
//!   with `--zip-mates`, combined record by record into mate pairs.
//!
//! - **Pluggable search**: Anything implementing [`Classifier`] can be used
//!   as the backend.
//!
//! # Example
//!
//! ```no_run
//! use seq_dispatch::{NullClassifier, Pipeline, RunConfig};
//! use std::sync::Arc;
//!
//! # fn main() -> seq_dispatch::Result<()> {
//! let mut config = RunConfig::new("proteins.fmi", "reads.fastq");
//! config.worker_count = 8;
//!
//! let summary = Pipeline::from_config(config, Arc::new(NullClassifier))?.run()?;
//! println!("{} reads classified", summary.classified);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod reader;

pub use classify::{Classifier, IndexHandle, NullClassifier, OutputSink, RunContext};
pub use config::{CliArgs, PairLayout, RunConfig, RunMode, SearchParams};
pub use error::{ClassifyError, PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use reader::{RecordReader, SeqFormat, WorkItem};
