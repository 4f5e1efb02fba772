//! Pipeline coordinator - orchestrates ingestion and parallel classification
//!
//! The coordinator is responsible for:
//! - Opening every input and detecting its format before any thread starts
//! - Setting up the work queue and spawning workers
//! - Running the producer loop on the calling thread
//! - Signaling completion, joining workers in spawn order
//! - Flushing output and reporting final statistics

use crate::classify::{Classifier, IndexHandle, OutputSink, RunContext};
use crate::config::{PairLayout, RunConfig};
use crate::error::{InputError, Result, WorkerError};
use crate::pipeline::queue::{WorkQueue, WorkQueueSender};
use crate::pipeline::worker::{Worker, WorkerTotals};
use crate::progress::ProgressReporter;
use crate::reader::{RecordReader, WorkItem};
use chrono::{DateTime, Utc};
use std::io::BufRead;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Records between progress display updates
const PROGRESS_INTERVAL: u64 = 10_000;

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records pushed to the work queue
    pub records_queued: u64,

    /// Records classified successfully
    pub classified: u64,

    /// Records whose classification failed
    pub failed: u64,

    /// Residues across all classified records
    pub residues: u64,

    /// Pushes that had to wait for a free slot
    pub backpressure_events: u64,

    /// Number of worker threads used
    pub workers: usize,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Time taken for the run
    pub duration: Duration,
}

impl RunSummary {
    /// Records per second over the whole run
    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records_queued as f64 / secs
        } else {
            0.0
        }
    }
}

/// Producer-side progress information for display
#[derive(Debug, Clone)]
pub struct RunProgress {
    /// Records pushed so far
    pub records_queued: u64,

    /// Items currently buffered in the queue
    pub queue_len: usize,

    /// Queue capacity
    pub queue_capacity: usize,

    /// Pushes that found the queue full
    pub backpressure_events: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl RunProgress {
    /// Calculate records per second rate
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_queued as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates ingestion and the worker pool for one run
pub struct Pipeline {
    /// Configuration
    config: Arc<RunConfig>,

    /// Shared, read-only run context
    context: Arc<RunContext>,

    /// Search backend
    classifier: Arc<dyn Classifier>,

    /// Optional live progress display
    progress: Option<ProgressReporter>,

    /// Run start time
    start_time: Instant,
}

impl Pipeline {
    /// Create a pipeline from an already built run context
    pub fn new(config: RunConfig, context: RunContext, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            config: Arc::new(config),
            context: Arc::new(context),
            classifier,
            progress: None,
            start_time: Instant::now(),
        }
    }

    /// Load the index and open the output sink named in `config`
    pub fn from_config(config: RunConfig, classifier: Arc<dyn Classifier>) -> Result<Self> {
        info!(path = %config.index_path.display(), "Reading index");
        let index = IndexHandle::load(&config.index_path)?;
        debug!(bytes = index.len(), "Index loaded");

        let sink = match &config.output_path {
            Some(path) => {
                info!(path = %path.display(), "Output file");
                OutputSink::create(path)?
            }
            None => OutputSink::stdout(),
        };

        let context = RunContext::new(index, config.params, sink);
        Ok(Self::new(config, context, classifier))
    }

    /// Attach a progress display updated by the producer loop
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Shared run context
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run the pipeline to completion over the configured input files
    pub fn run(self) -> Result<RunSummary> {
        // Every input is opened and sniffed before a single thread exists
        let primary = RecordReader::from_path(&self.config.input_path)?;
        let mate = self
            .config
            .mate_path
            .as_ref()
            .map(|path| RecordReader::from_path(path))
            .transpose()?;

        self.run_streams(primary, mate)
    }

    /// Run the pipeline over readers that are already open
    ///
    /// The input paths in the configuration are ignored; `mate` selects
    /// paired mode and `pair_layout` decides how it is fed.
    pub fn run_streams<R: BufRead>(
        mut self,
        primary: RecordReader<R>,
        mate: Option<RecordReader<R>>,
    ) -> Result<RunSummary> {
        self.start_time = Instant::now();
        let started_at = Utc::now();

        info!(path = %primary.path().display(), format = %primary.format(), "Input opened");
        if let Some(mate) = &mate {
            info!(path = %mate.path().display(), format = %mate.format(), "Mate input opened");
            if mate.format() != primary.format() {
                warn!(
                    primary = %primary.format(),
                    mate = %mate.format(),
                    "Paired inputs have different formats"
                );
            }
        }

        let queue = WorkQueue::new(self.config.queue_size);
        let stats = queue.stats();

        let workers = match self.spawn_workers(&queue) {
            Ok(workers) => workers,
            Err((spawned, e)) => {
                queue.into_sender().signal_completion();
                join_workers(spawned);
                return Err(e.into());
            }
        };
        let worker_count = workers.len();

        info!(
            threads = worker_count,
            started_at = %started_at.to_rfc3339(),
            "Start search using {} threads",
            worker_count
        );

        if let Some(progress) = &self.progress {
            progress.set_status("Reading input");
        }

        let sender = queue.into_sender();
        let produced = self.produce(&sender, primary, mate);
        sender.signal_completion();

        let (totals, worker_error) = join_workers(workers);
        let flushed = self.context.sink().flush().map_err(InputError::Flush);

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let records_queued = produced?;
        if let Some(e) = worker_error {
            return Err(e.into());
        }
        flushed?;

        let duration = self.start_time.elapsed();
        info!(
            records = records_queued,
            dequeued = stats.throughput(),
            classified = totals.classified,
            failed = totals.failed,
            lines = self.context.sink().lines_written(),
            duration_secs = duration.as_secs_f64(),
            "Finished"
        );

        Ok(RunSummary {
            records_queued,
            classified: totals.classified,
            failed: totals.failed,
            residues: totals.residues,
            backpressure_events: stats.backpressure_count(),
            workers: worker_count,
            started_at,
            duration,
        })
    }

    /// Spawn worker threads. On failure, returns the workers already running.
    fn spawn_workers(
        &self,
        queue: &WorkQueue,
    ) -> std::result::Result<Vec<Worker>, (Vec<Worker>, WorkerError)> {
        let mut workers = Vec::with_capacity(self.config.worker_count);

        for id in 0..self.config.worker_count {
            match Worker::spawn(
                id,
                Arc::clone(&self.context),
                Arc::clone(&self.classifier),
                queue.receiver(),
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => return Err((workers, e)),
            }
        }

        debug!(count = workers.len(), "Workers spawned");
        Ok(workers)
    }

    /// Producer loop: feed every configured input into the queue
    fn produce<R: BufRead>(
        &self,
        sender: &WorkQueueSender,
        primary: RecordReader<R>,
        mate: Option<RecordReader<R>>,
    ) -> Result<u64> {
        match (self.config.pair_layout, mate) {
            (PairLayout::Zipped, Some(mate)) => self.produce_zipped(sender, primary, mate),
            (_, mate) => {
                let mut count = self.produce_stream(sender, primary, 0)?;
                if let Some(mate) = mate {
                    count = self.produce_stream(sender, mate, count)?;
                }
                Ok(count)
            }
        }
    }

    /// Queue every record of one stream, continuing the running count
    fn produce_stream<R: BufRead>(
        &self,
        sender: &WorkQueueSender,
        reader: RecordReader<R>,
        queued: u64,
    ) -> Result<u64> {
        let path = reader.path().to_path_buf();
        let mut count = queued;

        for item in reader {
            self.push(sender, item?)?;
            count += 1;
            self.report_progress(sender, count);
        }

        debug!(path = %path.display(), records = count - queued, "Input exhausted");
        Ok(count)
    }

    /// Queue records of both streams in lockstep, one item per mate pair
    fn produce_zipped<R: BufRead>(
        &self,
        sender: &WorkQueueSender,
        mut primary: RecordReader<R>,
        mut mate: RecordReader<R>,
    ) -> Result<u64> {
        let mut count = 0;

        loop {
            let item = match (primary.next(), mate.next()) {
                (None, None) => break,
                (Some(read), Some(mate_read)) => read?.with_mate(mate_read?.sequence),
                (Some(read), None) => {
                    read?;
                    return Err(mate_mismatch(&primary, &mate).into());
                }
                (None, Some(mate_read)) => {
                    mate_read?;
                    return Err(mate_mismatch(&primary, &mate).into());
                }
            };

            self.push(sender, item)?;
            count += 1;
            self.report_progress(sender, count);
        }

        debug!(pairs = count, "Paired inputs exhausted");
        Ok(count)
    }

    fn push(&self, sender: &WorkQueueSender, item: WorkItem) -> Result<()> {
        sender
            .push(item)
            .map_err(|_| WorkerError::AllWorkersDead.into())
    }

    fn report_progress(&self, sender: &WorkQueueSender, count: u64) {
        let Some(progress) = &self.progress else {
            return;
        };
        if count % PROGRESS_INTERVAL != 0 {
            return;
        }

        progress.update(&RunProgress {
            records_queued: count,
            queue_len: sender.len(),
            queue_capacity: sender.capacity(),
            backpressure_events: sender.stats().backpressure_count(),
            elapsed: self.start_time.elapsed(),
        });
    }
}

fn mate_mismatch<R: BufRead>(primary: &RecordReader<R>, mate: &RecordReader<R>) -> InputError {
    InputError::MateCountMismatch {
        primary: primary.path().to_path_buf(),
        mate: mate.path().to_path_buf(),
        primary_count: primary.records_read(),
        mate_count: mate.records_read(),
    }
}

/// Join workers in spawn order and collect their totals
///
/// Every worker is joined even if one of them failed; the first failure is
/// returned alongside the totals.
fn join_workers(workers: Vec<Worker>) -> (WorkerTotals, Option<WorkerError>) {
    let mut totals = WorkerTotals::default();
    let mut first_error = None;

    for worker in workers {
        let stats = worker.stats();
        let id = worker.id();
        if let Err(e) = worker.join() {
            warn!(worker = id, error = %e, "Worker failed to join cleanly");
            first_error.get_or_insert(e);
        }
        totals.add(&stats);
    }

    (totals, first_error)
}
