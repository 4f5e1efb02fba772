//! Classification boundary
//!
//! The search algorithm itself lives behind the `Classifier` trait. The
//! pipeline only hands each `WorkItem` over together with the shared
//! `RunContext`; the classifier is responsible for writing its result to
//! the context's output sink.

pub mod context;
pub mod index;
pub mod sink;

pub use context::RunContext;
pub use index::IndexHandle;
pub use sink::OutputSink;

use crate::error::ClassifyError;
use crate::reader::WorkItem;

/// Search backend invoked once per work item
///
/// Implementations are shared by every worker thread. A failure for one
/// item must be reported through the returned error and never affect other
/// items.
pub trait Classifier: Send + Sync {
    /// Classify one item and append the result to `ctx.sink()`
    fn classify(&self, item: &WorkItem, ctx: &RunContext) -> Result<(), ClassifyError>;
}

/// Backend that reports every read as unclassified
///
/// Emits one `U\t<name>\t0` line per item. Used when no search backend is
/// linked in, and as a baseline for throughput measurements.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClassifier;

impl Classifier for NullClassifier {
    fn classify(&self, item: &WorkItem, ctx: &RunContext) -> Result<(), ClassifyError> {
        ctx.sink()
            .write_line(&format!("U\t{}\t0", item.name))
            .map_err(|source| ClassifyError::Output {
                name: item.name.clone(),
                source,
            })
    }
}

impl<F> Classifier for F
where
    F: Fn(&WorkItem, &RunContext) -> Result<(), ClassifyError> + Send + Sync,
{
    fn classify(&self, item: &WorkItem, ctx: &RunContext) -> Result<(), ClassifyError> {
        self(item, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchParams;

    #[test]
    fn test_null_classifier_output() {
        let out = tempfile::NamedTempFile::new().unwrap();
        let ctx = RunContext::new(
            IndexHandle::from_bytes("mem.fmi", vec![0u8; 8]).unwrap(),
            SearchParams::default(),
            OutputSink::create(out.path()).unwrap(),
        );

        NullClassifier.classify(&WorkItem::new("read_7 length=4", "ACGT"), &ctx).unwrap();
        ctx.sink().flush().unwrap();

        let text = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(text, "U\tread_7 length=4\t0\n");
    }

    #[test]
    fn test_closure_classifier() {
        let ctx = RunContext::new(
            IndexHandle::from_bytes("mem.fmi", vec![1]).unwrap(),
            SearchParams::default(),
            OutputSink::from_writer(Vec::new(), "memory"),
        );

        let rejecting = |item: &WorkItem, _: &RunContext| -> Result<(), ClassifyError> {
            Err(ClassifyError::Search {
                name: item.name.clone(),
                reason: "no seed hits".into(),
            })
        };
        let err = rejecting.classify(&WorkItem::new("r1", "A"), &ctx).unwrap_err();
        assert!(err.to_string().contains("no seed hits"));
        assert_eq!(ctx.sink().lines_written(), 0);
    }
}
