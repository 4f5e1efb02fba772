//! Run context shared by all workers
//!
//! Built once before any worker starts and read concurrently afterwards.
//! The sink is the only part that is written to, and it locks internally.

use crate::classify::index::IndexHandle;
use crate::classify::sink::OutputSink;
use crate::config::SearchParams;

/// Immutable per-run state handed to the classifier
#[derive(Debug)]
pub struct RunContext {
    index: IndexHandle,
    params: SearchParams,
    sink: OutputSink,
}

impl RunContext {
    pub fn new(index: IndexHandle, params: SearchParams, sink: OutputSink) -> Self {
        Self { index, params, sink }
    }

    /// Loaded index
    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Search thresholds
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Shared output sink
    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }
}
