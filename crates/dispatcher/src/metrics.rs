//! Dispatcher counters for observability
//!
//! Shared through an `Arc` so a [`DispatcherHandle`](crate::DispatcherHandle)
//! can report progress while the dispatcher runs on another task.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Live counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Tasks currently buffered
    pending: AtomicUsize,
    /// Valid tasks accepted into the buffer
    submitted: AtomicU64,
    /// Submissions rejected by validation
    rejected: AtomicU64,
    /// Batches handed to the processor
    batches: AtomicU64,
    /// Tasks handed to the processor
    delivered: AtomicU64,
    /// Processor calls that returned an error
    processor_failures: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn set_pending(&self, len: usize) {
        self.pending.store(len, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Count one batch of `len` tasks going to the processor
    pub fn record_batch(&self, len: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn processor_failures(&self) -> u64 {
        self.processor_failures.load(Ordering::Relaxed)
    }

    pub fn inc_processor_failures(&self) {
        self.processor_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pending: self.pending(),
            submitted: self.submitted(),
            rejected: self.rejected(),
            batches: self.batches(),
            delivered: self.delivered(),
            processor_failures: self.processor_failures(),
        }
    }
}

/// Point-in-time copy of [`DispatchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pending: usize,
    pub submitted: u64,
    pub rejected: u64,
    pub batches: u64,
    pub delivered: u64,
    pub processor_failures: u64,
}
