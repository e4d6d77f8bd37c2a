//! FileProcessor - writes each batch to its own JSON file

use chrono::{DateTime, Utc};
use contracts::{BatchProcessor, ContractError, Task};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileProcessor
#[derive(Debug, Clone)]
pub struct FileProcessorConfig {
    /// Directory receiving `batch_<seq>.json` files
    pub base_path: PathBuf,
}

impl FileProcessorConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./batches"));

        Self { base_path }
    }
}

/// On-disk layout of one batch
#[derive(Serialize)]
struct BatchRecord<'a> {
    sequence: u64,
    written_at: DateTime<Utc>,
    size: usize,
    tasks: &'a [Task],
}

/// Processor that persists batches as JSON documents
pub struct FileProcessor {
    name: String,
    config: FileProcessorConfig,
    next_sequence: u64,
}

impl FileProcessor {
    /// Create a new FileProcessor, creating the output directory if needed
    pub fn new(name: impl Into<String>, config: FileProcessorConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            next_sequence: 1,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileProcessorConfig::from_params(params))
    }

    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    /// Path the batch with `sequence` is written to
    pub fn batch_path(&self, sequence: u64) -> PathBuf {
        self.config
            .base_path
            .join(format!("batch_{:06}.json", sequence))
    }

    fn write_batch(&self, sequence: u64, batch: &[Task]) -> std::io::Result<()> {
        let record = BatchRecord {
            sequence,
            written_at: Utc::now(),
            size: batch.len(),
            tasks: batch,
        };

        let mut writer = BufWriter::new(File::create(self.batch_path(sequence))?);
        serde_json::to_writer_pretty(&mut writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()
    }

    fn persist_batch(&mut self, batch: &[Task]) -> Result<(), ContractError> {
        let sequence = self.next_sequence;
        self.write_batch(sequence, batch).map_err(|e| {
            error!(processor = %self.name, sequence, error = %e, "Write failed");
            ContractError::processor_failed(&self.name, batch.len(), e.to_string())
        })?;
        self.next_sequence += 1;
        debug!(processor = %self.name, sequence, "Batch written");
        Ok(())
    }
}

impl BatchProcessor for FileProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_processor_process",
        skip(self, batch),
        fields(processor = %self.name, size = batch.len())
    )]
    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        self.persist_batch(&batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_processor_writes_one_file_per_batch() {
        let dir = tempdir().unwrap();
        let config = FileProcessorConfig {
            base_path: dir.path().join("out"),
        };

        let mut processor = FileProcessor::new("disk", config).unwrap();
        processor
            .process(vec![Task::new("Task1", 1), Task::new("Task2", 2)])
            .await
            .unwrap();
        processor.process(vec![Task::new("Task3", 3)]).await.unwrap();

        let entries: Vec<_> = fs::read_dir(processor.base_path()).unwrap().collect();
        assert_eq!(entries.len(), 2);

        let first: Value =
            serde_json::from_str(&fs::read_to_string(processor.batch_path(1)).unwrap()).unwrap();
        assert_eq!(first["sequence"], 1);
        assert_eq!(first["size"], 2);
        assert_eq!(first["tasks"][0]["kind"], "Task1");
        assert_eq!(first["tasks"][1]["payload"], 2);
    }

    #[test]
    fn test_config_from_params() {
        let params = HashMap::from([("base_path".to_string(), "/tmp/x".to_string())]);
        assert_eq!(
            FileProcessorConfig::from_params(&params).base_path,
            PathBuf::from("/tmp/x")
        );
        assert_eq!(
            FileProcessorConfig::from_params(&HashMap::new()).base_path,
            PathBuf::from("./batches")
        );
    }
}
