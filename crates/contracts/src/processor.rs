//! BatchProcessor trait - Dispatcher output interface
//!
//! Defines the abstract interface for batch consumers.

use crate::{ContractError, Task};

/// Batch consumer trait
///
/// The dispatcher hands every completed batch to exactly one processor.
/// Batches are never empty and preserve submission order.
#[trait_variant::make(BatchProcessor: Send)]
pub trait LocalBatchProcessor {
    /// Processor name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one batch
    ///
    /// # Errors
    /// Any error is returned unchanged to the caller whose submission
    /// triggered the flush. The dispatcher does not retry.
    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError>;
}
