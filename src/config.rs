//! Configuration types for seq-dispatch
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Search parameters handed to the classifier
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_THREADS: usize = 1024;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Default work queue capacity
pub const DEFAULT_QUEUE_SIZE: usize = 500;

/// Smallest seed length the search backend supports
const MIN_SEED_LENGTH: i64 = 7;

/// Classify sequencing reads against a precomputed index
#[derive(Parser, Debug, Clone)]
#[command(
    name = "seq-dispatch",
    version,
    about = "Classify FASTA/FASTQ reads against a precomputed index using a pool of worker threads",
    long_about = "Streams reads from one or two FASTA/FASTQ files (format is auto-detected),\n\
                  queues them in a bounded work queue and classifies them in parallel.\n\n\
                  Results are written to stdout unless an output file is given.",
    after_help = "EXAMPLES:\n    \
        seq-dispatch -f proteins.fmi -i reads.fastq\n    \
        seq-dispatch -f proteins.fmi -i reads_1.fq -j reads_2.fq -z 16 -o out.tsv\n    \
        seq-dispatch -f proteins.fmi -i contigs.fa -a greedy -e 3 -s 70"
)]
pub struct CliArgs {
    /// Index file
    #[arg(short = 'f', long = "index", value_name = "FILE")]
    pub index: PathBuf,

    /// Input file containing reads in FASTA or FASTQ format
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Second input file for paired-end reads
    #[arg(short = 'j', long = "mate-input", value_name = "FILE")]
    pub mate_input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of parallel worker threads
    #[arg(short = 'z', long, default_value_t = 1, value_name = "NUM")]
    pub threads: usize,

    /// Run mode
    #[arg(short = 'a', long, value_enum, default_value_t = RunMode::Mem)]
    pub mode: RunMode,

    /// Number of mismatches allowed
    #[arg(
        short = 'e',
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    pub mismatches: i64,

    /// Minimum match length in MEM mode
    #[arg(
        short = 'm',
        long,
        default_value_t = 11,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    pub min_fragment_length: i64,

    /// Minimum match score in greedy mode
    #[arg(
        short = 's',
        long,
        default_value_t = 65,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    pub min_score: i64,

    /// Seed length for finding matches
    #[arg(
        short = 'l',
        long,
        default_value_t = 7,
        allow_negative_numbers = true,
        value_name = "INT"
    )]
    pub seed_length: i64,

    /// Work queue capacity (bounds memory held by queued reads)
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE, value_name = "NUM")]
    pub queue_size: usize,

    /// Combine records of the two input files into mate pairs instead of
    /// classifying the second file after the first
    #[arg(long)]
    pub zip_mates: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Classification run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Maximum exact matches
    Mem,
    /// Greedy extension scored with BLOSUM62
    #[value(name = "greedyblosum", alias = "greedy")]
    GreedyBlosum,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Mem => write!(f, "mem"),
            RunMode::GreedyBlosum => write!(f, "greedyblosum"),
        }
    }
}

/// Thresholds handed to the search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub mode: RunMode,
    pub min_score: u32,
    pub min_fragment_length: u32,
    pub mismatches: u32,
    pub seed_length: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            mode: RunMode::Mem,
            min_score: 65,
            min_fragment_length: 11,
            mismatches: 0,
            seed_length: 7,
        }
    }
}

impl SearchParams {
    /// Validate raw CLI values
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: args.mode,
            min_score: threshold(
                "minimum score (-s)",
                args.min_score,
                1,
                "must be greater than 0",
            )?,
            min_fragment_length: threshold(
                "minimum fragment length (-m)",
                args.min_fragment_length,
                1,
                "must be greater than 0",
            )?,
            mismatches: threshold("mismatches (-e)", args.mismatches, 0, "must be >= 0")?,
            seed_length: threshold(
                "seed length (-l)",
                args.seed_length,
                MIN_SEED_LENGTH,
                "must be >= 7",
            )?,
        })
    }
}

fn threshold(
    parameter: &'static str,
    value: i64,
    min: i64,
    reason: &'static str,
) -> Result<u32, ConfigError> {
    if value < min {
        return Err(ConfigError::InvalidThreshold { parameter, value, reason });
    }
    u32::try_from(value).map_err(|_| ConfigError::InvalidThreshold {
        parameter,
        value,
        reason: "value too large",
    })
}

/// How records from a second input file are fed to the workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairLayout {
    /// Second file is queued after the first is exhausted
    Sequential,
    /// Records of both files are read in lockstep and combined into one item
    Zipped,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Index file path
    pub index_path: PathBuf,

    /// Primary input path
    pub input_path: PathBuf,

    /// Optional mate input path (paired mode)
    pub mate_path: Option<PathBuf>,

    /// Output path, stdout when unset
    pub output_path: Option<PathBuf>,

    /// Number of worker threads
    pub worker_count: usize,

    /// Work queue capacity
    pub queue_size: usize,

    /// Layout of paired input
    pub pair_layout: PairLayout,

    /// Search thresholds
    pub params: SearchParams,

    /// Show progress indicator
    pub show_progress: bool,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.threads == 0 || args.threads > MAX_THREADS {
            return Err(ConfigError::InvalidThreadCount {
                count: args.threads,
                max: MAX_THREADS,
            });
        }

        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        let params = SearchParams::from_args(&args)?;

        let pair_layout = match (args.zip_mates, args.mate_input.is_some()) {
            (true, false) => return Err(ConfigError::ZipWithoutMates),
            (true, true) => PairLayout::Zipped,
            (false, _) => PairLayout::Sequential,
        };

        Ok(Self {
            index_path: args.index,
            input_path: args.input,
            mate_path: args.mate_input,
            output_path: args.output,
            worker_count: args.threads,
            queue_size: args.queue_size,
            pair_layout,
            params,
            show_progress: !args.quiet,
        })
    }

    /// Minimal configuration for a single input
    pub fn new(index_path: impl Into<PathBuf>, input_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            input_path: input_path.into(),
            mate_path: None,
            output_path: None,
            worker_count: 1,
            queue_size: DEFAULT_QUEUE_SIZE,
            pair_layout: PairLayout::Sequential,
            params: SearchParams::default(),
            show_progress: false,
        }
    }

    /// Returns true if a second input file is configured
    pub fn is_paired(&self) -> bool {
        self.mate_path.is_some()
    }

    /// All input paths in the order they are read
    pub fn input_paths(&self) -> Vec<&PathBuf> {
        std::iter::once(&self.input_path).chain(self.mate_path.as_ref()).collect()
    }
}
