//! # Dispatcher
//!
//! Bounded-batch task dispatcher.
//!
//! Responsibilities:
//! - Validate every inbound item before it is buffered
//! - Group tasks into fixed-size batches, preserving arrival order
//! - Hand each full batch, and the final partial one, to a single processor
//! - Close the stream on the `"quit"` sentinel

pub mod buffer;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod processors;
pub mod validate;

pub use buffer::BatchBuffer;
pub use contracts::{BatchProcessor, Inbound, Task, ValidationPolicy};
pub use dispatcher::{create_dispatcher, Ack, Dispatcher, DispatcherState};
pub use error::DispatcherError;
pub use handle::{DispatcherHandle, Submitter};
pub use metrics::{DispatchMetrics, StatsSnapshot};
pub use processors::{
    create_processor, AnyProcessor, FileProcessor, FileProcessorConfig, FnProcessor, LogProcessor,
    PerTaskProcessor,
};
pub use validate::validate;
