//! Bounded work queue with backpressure
//!
//! One producer pushes `WorkItem`s, many workers pop them. When the queue
//! holds `capacity` items the producer blocks until a worker makes room.
//!
//! End of input is signaled by consuming the producer handle: once the last
//! sender is gone, workers drain whatever is still buffered and then see
//! `None` from `pop`.

use crate::reader::WorkItem;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total items enqueued
    pub enqueued: AtomicU64,

    /// Total items dequeued
    pub dequeued: AtomicU64,

    /// Number of pushes that found the queue full
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Items pushed so far
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Items handed to workers so far
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Work queue for read records
pub struct WorkQueue {
    /// Sender, handed to the producer by `into_sender`
    sender: Sender<WorkItem>,

    /// Receiver, cloned for each worker
    receiver: Receiver<WorkItem>,

    /// Queue capacity
    capacity: usize,

    /// Queue statistics
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new work queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Create a queue and split it into its producer and a first receiver
    pub fn bounded(capacity: usize) -> (WorkQueueSender, WorkQueueReceiver) {
        let queue = Self::new(capacity);
        let receiver = queue.receiver();
        (queue.into_sender(), receiver)
    }

    /// Get a receiver for this queue (one per worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Turn the queue into its single producer handle
    ///
    /// Receivers must be taken before this call; the queue's own receiver
    /// is dropped here.
    pub fn into_sender(self) -> WorkQueueSender {
        WorkQueueSender {
            sender: self.sender,
            capacity: self.capacity,
            stats: self.stats,
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

}

/// Producer handle. Not `Clone`: there is exactly one producer.
pub struct WorkQueueSender {
    sender: Sender<WorkItem>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl WorkQueueSender {
    /// Push an item, blocking while the queue is full
    ///
    /// Returns the item back if every receiver has been dropped.
    pub fn push(&self, item: WorkItem) -> Result<(), WorkItem> {
        match self.sender.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                self.sender.send(item).map_err(|e| e.into_inner())?;
            }
            Err(TrySendError::Disconnected(item)) => return Err(item),
        }
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Close the queue. Workers drain buffered items, then stop.
    pub fn signal_completion(self) {
        debug!(
            enqueued = self.stats.enqueued_count(),
            buffered = self.sender.len(),
            "Work queue closed"
        );
        drop(self.sender);
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Handle for receiving items from the queue
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<WorkItem>,
    stats: Arc<QueueStats>,
}

impl WorkQueueReceiver {
    /// Receive an item from the queue
    ///
    /// Blocks until an item is available. Returns `None` once the producer
    /// has signaled completion and the queue is drained.
    pub fn pop(&self) -> Option<WorkItem> {
        match self.receiver.recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Try to receive an item without blocking
    pub fn try_pop(&self) -> Option<WorkItem> {
        match self.receiver.try_recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }
}
