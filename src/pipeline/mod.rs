//! Bounded dispatch pipeline
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!                 │   Pipeline (calling thread)   │
//!                 │  - open + detect inputs       │
//!                 │  - RecordReader -> WorkItem   │
//!                 └──────────────┬───────────────┘
//!                                │ push (blocks when full)
//!                                ▼
//!                 ┌──────────────────────────────┐
//!                 │     Work Queue               │
//!                 │  (crossbeam bounded, C=500)  │
//!                 └──────────────┬───────────────┘
//!                                │ pop (blocks when empty)
//!       ┌────────────────────────┼────────────────────────┐
//!       │                        │                        │
//! ┌─────▼─────┐            ┌─────▼─────┐            ┌─────▼─────┐
//! │ Worker 0  │            │ Worker 1  │            │ Worker N  │
//! │ classify  │            │ classify  │            │ classify  │
//! └─────┬─────┘            └─────┬─────┘            └─────┬─────┘
//!       └────────────────────────┼────────────────────────┘
//!                                ▼
//!                     OutputSink (one lock per line)
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{Pipeline, RunProgress, RunSummary};
pub use queue::{QueueStats, WorkQueue, WorkQueueReceiver, WorkQueueSender};
pub use worker::{Worker, WorkerStats, WorkerTotals};
