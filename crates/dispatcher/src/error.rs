//! Dispatcher error types

use thiserror::Error;

use crate::dispatcher::DispatcherState;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Processor creation error
    #[error("failed to create processor '{name}': {message}")]
    ProcessorCreation { name: String, message: String },

    /// Batch capacity must be at least one
    #[error("invalid batch capacity {capacity}: must be >= 1")]
    InvalidCapacity { capacity: usize },

    /// Submitted value is not a well-formed task
    #[error("invalid task: expected a task with a non-empty kind, got {found}")]
    InvalidTask { found: String },

    /// Submission after the stream was closed
    #[error("stream closed: dispatcher is {state}")]
    StreamClosed { state: DispatcherState },

    /// Append on a full buffer
    #[error("buffer overflow: len={len}, capacity={capacity}")]
    BufferOverflow { len: usize, capacity: usize },

    /// Error raised by the processor, passed through untouched
    #[error(transparent)]
    Processor(#[from] contracts::ContractError),

    /// Background dispatcher task is gone
    #[error("dispatcher worker stopped: {message}")]
    WorkerGone { message: String },
}

impl DispatcherError {
    /// Create a processor creation error
    pub fn processor_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessorCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid task error
    pub fn invalid_task(found: impl Into<String>) -> Self {
        Self::InvalidTask {
            found: found.into(),
        }
    }

    /// Create a worker gone error
    pub fn worker_gone(message: impl Into<String>) -> Self {
        Self::WorkerGone {
            message: message.into(),
        }
    }

    /// True when the error came from the processor rather than the dispatcher
    pub fn is_processor_error(&self) -> bool {
        matches!(self, Self::Processor(_))
    }
}
