//! Layered error definitions
//!
//! Categorized by source: config / processor / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Processor Errors =====
    /// Processor failed to handle a batch
    #[error("processor '{processor}' failed on batch of {batch_len}: {message}")]
    ProcessorFailed {
        processor: String,
        batch_len: usize,
        message: String,
    },

    /// Processor failed on a single task inside a batch
    #[error("processor '{processor}' failed on task '{kind}': {message}")]
    TaskFailed {
        processor: String,
        kind: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create batch processing error
    pub fn processor_failed(
        processor: impl Into<String>,
        batch_len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::ProcessorFailed {
            processor: processor.into(),
            batch_len,
            message: message.into(),
        }
    }

    /// Create per-task processing error
    pub fn task_failed(
        processor: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TaskFailed {
            processor: processor.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}
