//! Worker thread logic for parallel classification
//!
//! Each worker:
//! - Pulls work items from the shared queue
//! - Hands each item to the classifier together with the run context
//! - Drops the item once classification returns
//! - Exits when the queue reports that no more work will arrive
//!
//! A failing or panicking classifier only affects the item being processed.

use crate::classify::{Classifier, RunContext};
use crate::error::{ClassifyError, WorkerError};
use crate::pipeline::queue::WorkQueueReceiver;
use crate::reader::WorkItem;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Items classified successfully
    pub classified: AtomicU64,

    /// Items whose classification failed
    pub failed: AtomicU64,

    /// Residues processed (read plus mate)
    pub residues: AtomicU64,
}

impl WorkerStats {
    fn record_classified(&self, residues: usize) {
        self.classified.fetch_add(1, Ordering::Relaxed);
        self.residues.fetch_add(residues as u64, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that classifies queued reads
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        context: Arc<RunContext>,
        classifier: Arc<dyn Classifier>,
        queue_rx: WorkQueueReceiver,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || worker_loop(id, context, classifier, queue_rx, stats_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            })
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    context: Arc<RunContext>,
    classifier: Arc<dyn Classifier>,
    queue_rx: WorkQueueReceiver,
    stats: Arc<WorkerStats>,
) {
    debug!(worker = id, "Worker starting");

    while let Some(item) = queue_rx.pop() {
        match classify_item(classifier.as_ref(), &item, &context) {
            Ok(()) => {
                trace!(worker = id, read = %item.name, "Read classified");
                stats.record_classified(item.total_len());
            }
            Err(e) => {
                stats.record_failure();
                warn!(worker = id, read = %item.name, error = %e, "Classification failed");
            }
        }
    }

    debug!(
        worker = id,
        classified = stats.classified.load(Ordering::Relaxed),
        failed = stats.failed.load(Ordering::Relaxed),
        "Worker shutting down"
    );
}

/// Run the classifier on one item, turning a panic into an error
fn classify_item(
    classifier: &dyn Classifier,
    item: &WorkItem,
    context: &RunContext,
) -> Result<(), ClassifyError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(item, context)));
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(ClassifyError::Panicked {
            name: item.name.clone(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Totals across a set of workers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTotals {
    pub classified: u64,
    pub failed: u64,
    pub residues: u64,
}

impl WorkerTotals {
    /// Add one worker's counters
    pub fn add(&mut self, stats: &WorkerStats) {
        self.classified += stats.classified.load(Ordering::Relaxed);
        self.failed += stats.failed.load(Ordering::Relaxed);
        self.residues += stats.residues.load(Ordering::Relaxed);
    }
}
