//! Closure-backed processors
//!
//! [`FnProcessor`] receives whole batches. [`PerTaskProcessor`] walks each
//! batch and hands tasks to a handler one at a time, in order.

use contracts::{BatchProcessor, ContractError, Task};
use tracing::instrument;

/// Processor wrapping a batch closure
pub struct FnProcessor<F> {
    name: String,
    f: F,
}

impl<F> FnProcessor<F>
where
    F: FnMut(Vec<Task>) -> Result<(), ContractError> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> BatchProcessor for FnProcessor<F>
where
    F: FnMut(Vec<Task>) -> Result<(), ContractError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        (self.f)(batch)
    }
}

/// Processor applying a handler to every task of a batch
///
/// Stops at the first failing task; the remaining tasks of that batch are
/// dropped along with it.
pub struct PerTaskProcessor<F> {
    name: String,
    handler: F,
}

impl<F> PerTaskProcessor<F>
where
    F: FnMut(Task) -> Result<(), ContractError> + Send,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> BatchProcessor for PerTaskProcessor<F>
where
    F: FnMut(Task) -> Result<(), ContractError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "per_task_processor_process",
        skip(self, batch),
        fields(processor = %self.name, size = batch.len())
    )]
    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        for task in batch {
            (self.handler)(task)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_processor_sees_whole_batch() {
        let mut sizes = Vec::new();
        {
            let mut processor = FnProcessor::new("sizes", |batch: Vec<Task>| {
                sizes.push(batch.len());
                Ok(())
            });
            processor.process(vec![Task::bare("a"), Task::bare("b")]).await.unwrap();
            processor.process(vec![Task::bare("c")]).await.unwrap();
        }
        assert_eq!(sizes, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_per_task_processor_keeps_order() {
        let mut seen = Vec::new();
        {
            let mut processor = PerTaskProcessor::new("each", |task: Task| {
                seen.push(task.kind().to_string());
                Ok(())
            });
            processor
                .process(vec![Task::bare("x"), Task::bare("y"), Task::bare("z")])
                .await
                .unwrap();
        }
        assert_eq!(seen, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_per_task_processor_stops_at_first_error() {
        let mut seen = Vec::new();
        let result = {
            let mut processor = PerTaskProcessor::new("each", |task: Task| {
                if task.kind() == "bad" {
                    return Err(ContractError::task_failed("each", "bad", "rejected"));
                }
                seen.push(task.kind().to_string());
                Ok(())
            });
            processor
                .process(vec![Task::bare("ok"), Task::bare("bad"), Task::bare("never")])
                .await
        };

        assert!(matches!(result, Err(ContractError::TaskFailed { .. })));
        assert_eq!(seen, vec!["ok"]);
    }
}
