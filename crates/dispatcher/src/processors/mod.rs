//! Processor implementations
//!
//! Contains LogProcessor, FileProcessor and the closure-backed processors.

mod file;
mod func;
mod log;

pub use self::file::{FileProcessor, FileProcessorConfig};
pub use self::func::{FnProcessor, PerTaskProcessor};
pub use self::log::LogProcessor;

use contracts::{BatchProcessor, ContractError, ProcessorConfig, ProcessorType, Task};
use tracing::instrument;

use crate::error::DispatcherError;

/// Processor built from configuration
pub enum AnyProcessor {
    Log(LogProcessor),
    File(FileProcessor),
}

impl BatchProcessor for AnyProcessor {
    fn name(&self) -> &str {
        match self {
            Self::Log(p) => p.name(),
            Self::File(p) => p.name(),
        }
    }

    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        match self {
            Self::Log(p) => p.process(batch).await,
            Self::File(p) => p.process(batch).await,
        }
    }
}

/// Create a processor from configuration
#[instrument(
    name = "dispatcher_create_processor",
    skip(config),
    fields(processor = %config.name, processor_type = ?config.processor_type)
)]
pub fn create_processor(config: &ProcessorConfig) -> Result<AnyProcessor, DispatcherError> {
    match config.processor_type {
        ProcessorType::Log => Ok(AnyProcessor::Log(LogProcessor::new(&config.name))),
        ProcessorType::File => {
            let processor = FileProcessor::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::processor_creation(&config.name, e.to_string()))?;
            Ok(AnyProcessor::File(processor))
        }
    }
}
