//! Dispatcher - batching state machine between producers and a processor
//!
//! A producer calls [`Dispatcher::submit`] once per item. Valid tasks are
//! buffered; a full buffer is handed to the processor before `submit`
//! returns. The `"quit"` sentinel flushes whatever is left and closes the
//! stream for good.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use contracts::{BatchProcessor, DispatcherConfig, Inbound, PoolConfig, ValidationPolicy};
use observability::{
    record_batch_flushed, record_batch_latency_ms, record_buffer_fill, record_processor_failure,
    record_task_rejected, record_task_submitted, FlushReason,
};
use tracing::{debug, error, info, instrument, warn};

use crate::buffer::BatchBuffer;
use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;
use crate::processors::{create_processor, AnyProcessor};
use crate::validate::validate;

/// Lifecycle state of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatcherState {
    /// Initial state, items are accepted
    Accepting,
    /// Sentinel received, final batch delivered
    Terminated,
    /// Stopped on an invalid item under [`ValidationPolicy::Abort`]
    Aborted,
}

impl DispatcherState {
    /// Terminal states accept no further submissions
    pub fn is_closed(&self) -> bool {
        !matches!(self, Self::Accepting)
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepting => write!(f, "accepting"),
            Self::Terminated => write!(f, "terminated"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Task buffered, `pending` tasks now waiting
    Buffered { pending: usize },
    /// Task filled the buffer and a batch of `batch_len` was processed
    Flushed { batch_len: usize },
    /// Sentinel received; `final_batch` is the size of the last batch,
    /// zero when nothing was left to deliver
    Completed { final_batch: usize },
}

impl Ack {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Batching dispatcher owning one buffer and one processor
pub struct Dispatcher<P> {
    buffer: BatchBuffer,
    processor: P,
    state: DispatcherState,
    policy: ValidationPolicy,
    metrics: Arc<DispatchMetrics>,
}

impl<P: BatchProcessor> Dispatcher<P> {
    /// Create a dispatcher flushing every `capacity` tasks
    ///
    /// # Errors
    /// `InvalidCapacity` when `capacity == 0`
    pub fn new(capacity: usize, processor: P) -> Result<Self, DispatcherError> {
        Ok(Self {
            buffer: BatchBuffer::new(capacity)?,
            processor,
            state: DispatcherState::Accepting,
            policy: ValidationPolicy::default(),
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }

    /// Create a dispatcher from configuration
    pub fn from_config(config: &DispatcherConfig, processor: P) -> Result<Self, DispatcherError> {
        Ok(Self::new(config.capacity, processor)?.with_policy(config.validation_policy))
    }

    /// Choose how invalid items are handled
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of tasks buffered but not yet delivered
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Shared counters, readable while the dispatcher runs elsewhere
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Consume the dispatcher and hand back its processor
    pub fn into_processor(self) -> P {
        self.processor
    }

    /// Tasks stranded in the buffer by an aborted stream.
    ///
    /// Always empty unless the dispatcher is [`DispatcherState::Aborted`].
    pub fn take_undelivered(&mut self) -> Vec<contracts::Task> {
        if self.state != DispatcherState::Aborted {
            return Vec::new();
        }
        let tasks = self.buffer.drain();
        self.sync_pending();
        tasks
    }

    /// Submit one item
    ///
    /// # Errors
    /// - `StreamClosed` once the dispatcher is terminated or aborted
    /// - `InvalidTask` when the item is not a well-formed task; the buffer
    ///   is untouched
    /// - the processor's own error when a flush fails
    #[instrument(
        name = "dispatcher_submit",
        skip(self, item),
        fields(processor = %self.processor.name(), state = %self.state)
    )]
    pub async fn submit(&mut self, item: impl Into<Inbound>) -> Result<Ack, DispatcherError> {
        if self.state.is_closed() {
            return Err(DispatcherError::StreamClosed { state: self.state });
        }

        let task = match validate(item.into()) {
            Ok(task) => task,
            Err(e) => {
                self.reject(&e);
                return Err(e);
            }
        };

        if task.is_sentinel() {
            return self.terminate().await;
        }

        record_task_submitted(task.kind());
        self.metrics.inc_submitted();
        self.buffer.append(task)?;

        if self.buffer.is_full() {
            let batch_len = self.flush(FlushReason::Full).await?;
            return Ok(Ack::Flushed { batch_len });
        }

        self.sync_pending();
        let pending = self.buffer.len();
        debug!(pending, capacity = self.buffer.capacity(), "Task buffered");
        Ok(Ack::Buffered { pending })
    }

    fn reject(&mut self, err: &DispatcherError) {
        self.metrics.inc_rejected();
        record_task_rejected();

        match self.policy {
            ValidationPolicy::Abort => {
                self.state = DispatcherState::Aborted;
                error!(
                    error = %err,
                    undelivered = self.buffer.len(),
                    "Invalid task, aborting stream"
                );
            }
            ValidationPolicy::Skip => {
                warn!(error = %err, "Invalid task skipped");
            }
        }
    }

    async fn terminate(&mut self) -> Result<Ack, DispatcherError> {
        // Closed before the final flush so a failing processor still leaves
        // the dispatcher terminated with an empty buffer.
        self.state = DispatcherState::Terminated;

        let final_batch = if self.buffer.is_empty() {
            0
        } else {
            self.flush(FlushReason::Final).await?
        };

        info!(
            final_batch,
            batches = self.metrics.batches(),
            delivered = self.metrics.delivered(),
            "Stream completed"
        );
        Ok(Ack::Completed { final_batch })
    }

    async fn flush(&mut self, reason: FlushReason) -> Result<usize, DispatcherError> {
        let batch = self.buffer.drain();
        let batch_len = batch.len();
        self.sync_pending();

        self.metrics.record_batch(batch_len);
        record_batch_flushed(reason, batch_len);

        let started = Instant::now();
        let result = self.processor.process(batch).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        record_batch_latency_ms(elapsed_ms);

        match result {
            Ok(()) => {
                info!(
                    batch_len,
                    reason = reason.as_str(),
                    elapsed_ms,
                    "Batch processed"
                );
                Ok(batch_len)
            }
            Err(e) => {
                self.metrics.inc_processor_failures();
                record_processor_failure(self.processor.name());
                error!(batch_len, error = %e, "Processor failed");
                Err(e.into())
            }
        }
    }

    fn sync_pending(&self) {
        let len = self.buffer.len();
        self.metrics.set_pending(len);
        record_buffer_fill(len);
    }
}

/// Convenience function to create a dispatcher from a pool config
#[instrument(name = "dispatcher_create", skip(config), fields(processor = %config.processor.name))]
pub fn create_dispatcher(config: &PoolConfig) -> Result<Dispatcher<AnyProcessor>, DispatcherError> {
    let processor = create_processor(&config.processor)?;
    Dispatcher::from_config(&config.dispatcher, processor)
}
