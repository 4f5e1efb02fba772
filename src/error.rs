//! Error types for seq-dispatch
//!
//! This module defines the error hierarchy for a classification run:
//! - Configuration errors (bad thresholds, thread counts)
//! - Input/output resource errors (unopenable or unreadable files)
//! - Format errors (input type auto-detection)
//! - Index loading errors
//! - Worker thread errors
//! - Per-item classification errors
//!
//! Everything except `ClassifyError` is fatal for a run. Classification
//! errors stay local to the worker that hit them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input or output file errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Input format detection errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Index loading errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid worker thread count
    #[error("Invalid thread count {count}: must be between 1 and {max}")]
    InvalidThreadCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Numeric threshold out of range
    #[error("Invalid value {value} for {parameter}: {reason}")]
    InvalidThreshold {
        parameter: &'static str,
        value: i64,
        reason: &'static str,
    },

    /// Zipped mates requested without a second input
    #[error("--zip-mates requires a second input file (-j)")]
    ZipWithoutMates,
}

/// Errors opening, reading or writing run files
#[derive(Error, Debug)]
pub enum InputError {
    /// File could not be opened
    #[error("Could not open file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be created
    #[error("Could not open file '{path}' for writing: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failed part-way through a stream
    #[error("Failed reading '{path}' near line {line}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// Header line is not valid UTF-8
    #[error("Header on line {line} of '{path}' is not valid UTF-8")]
    InvalidHeader { path: PathBuf, line: u64 },

    /// Zipped mate files ran out of records at different points
    #[error(
        "Mate files have different record counts: \
         '{primary}' has {primary_count}+, '{mate}' has {mate_count}+"
    )]
    MateCountMismatch {
        primary: PathBuf,
        mate: PathBuf,
        primary_count: u64,
        mate_count: u64,
    },

    /// Flushing the output sink failed
    #[error("Failed to flush output: {0}")]
    Flush(#[source] std::io::Error),
}

/// Input format auto-detection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// First byte is neither '>' nor '@'
    #[error(
        "Auto-detection of file type for file '{path}' failed: \
         unexpected leading byte {found:?}"
    )]
    Unrecognized { path: PathBuf, found: char },

    /// Stream contained no data at all
    #[error("Input file '{path}' is empty")]
    EmptyInput { path: PathBuf },
}

/// Index loading errors
#[derive(Error, Debug)]
pub enum IndexError {
    /// Index file could not be read
    #[error("Could not read index file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index file is structurally unusable
    #[error("Malformed index file '{path}': {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// OS refused to spawn a worker thread
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked outside of a classification call
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Every worker exited while input was still being queued
    #[error("All workers have terminated unexpectedly")]
    AllWorkersDead,
}

/// Failure classifying a single work item
///
/// Never escalated into a `PipelineError`; the worker logs it and moves on.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Writing the result to the output sink failed
    #[error("Failed to write result for '{name}': {source}")]
    Output {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Search backend rejected the item
    #[error("Classification of '{name}' failed: {reason}")]
    Search { name: String, reason: String },

    /// Search backend panicked
    #[error("Classifier panicked on '{name}': {message}")]
    Panicked { name: String, message: String },
}

impl PipelineError {
    /// Returns true if the error was raised before any worker thread started
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_)
                | PipelineError::Format(_)
                | PipelineError::Index(_)
                | PipelineError::Input(InputError::Open { .. } | InputError::Create { .. })
        )
    }
}

/// Result type alias for PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for InputError
pub type InputResult<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message() {
        let err = FormatError::Unrecognized {
            path: PathBuf::from("reads.txt"),
            found: 'X',
        };
        let msg = err.to_string();
        assert!(msg.contains("reads.txt"));
        assert!(msg.contains("'X'"));
    }

    #[test]
    fn test_error_conversion() {
        let fmt_err = FormatError::EmptyInput {
            path: PathBuf::from("empty.fa"),
        };
        let err: PipelineError = fmt_err.into();
        assert!(matches!(err, PipelineError::Format(_)));
        assert!(err.is_pre_dispatch());
    }

    #[test]
    fn test_read_error_is_mid_run() {
        let err: PipelineError = InputError::Read {
            path: PathBuf::from("reads.fq"),
            line: 42,
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"),
        }
        .into();
        assert!(!err.is_pre_dispatch());
        assert!(err.to_string().contains("line 42"));
    }

    #[test]
    fn test_threshold_message() {
        let err = ConfigError::InvalidThreshold {
            parameter: "seed length",
            value: 3,
            reason: "must be >= 7",
        };
        assert_eq!(err.to_string(), "Invalid value 3 for seed length: must be >= 7");
    }
}
