//! LogProcessor - logs batch summaries via tracing

use contracts::{BatchProcessor, ContractError, Task};
use tracing::{debug, info, instrument};

/// Processor that logs every batch, useful for dry runs and debugging
pub struct LogProcessor {
    name: String,
    batches_seen: u64,
}

impl LogProcessor {
    /// Create a new LogProcessor with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches_seen: 0,
        }
    }

    /// Number of batches logged so far
    pub fn batches_seen(&self) -> u64 {
        self.batches_seen
    }

    fn log_batch(&self, batch: &[Task]) {
        let kinds: Vec<&str> = batch.iter().map(|t| t.kind().as_str()).collect();

        info!(
            processor = %self.name,
            batch = self.batches_seen,
            size = batch.len(),
            kinds = ?kinds,
            "Batch received"
        );

        for task in batch {
            debug!(
                processor = %self.name,
                kind = %task.kind(),
                payload = %task.payload(),
                "Processing task"
            );
        }
    }
}

impl BatchProcessor for LogProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_processor_process",
        skip(self, batch),
        fields(processor = %self.name, size = batch.len())
    )]
    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        self.batches_seen += 1;
        self.log_batch(&batch);
        Ok(())
    }
}
