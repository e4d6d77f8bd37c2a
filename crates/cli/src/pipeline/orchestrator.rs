//! Pipeline orchestrator - wires a task source to a dispatcher.
//!
//! The dispatcher runs behind a [`DispatcherHandle`]; the orchestrator feeds
//! it from the source until the stream completes, and submits the quit
//! sentinel itself when the source runs dry, the timeout expires or a
//! shutdown signal arrives.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{BatchProcessor, ContractError, Inbound, PoolConfig, Task, ValidationPolicy};
use dispatcher::{
    create_processor, Ack, Dispatcher, DispatcherError, DispatcherHandle, DispatcherState,
    Submitter,
};
use observability::{BatchMetricsAggregator, FlushReason};
use tracing::{debug, info, warn};

use super::{PipelineStats, RunOutcome, SourceSpec, TaskSource};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated pool configuration
    pub pool: PoolConfig,

    /// Where tasks are read from
    pub source: SourceSpec,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until the stream ends
    ///
    /// `shutdown` resolving is treated like a quit request.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let pool = &self.config.pool;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut source = TaskSource::open(&self.config.source).await?;

        let aggregator = Arc::new(Mutex::new(BatchMetricsAggregator::new()));
        let processor = StatsProcessor {
            inner: create_processor(&pool.processor).context("Failed to create processor")?,
            capacity: pool.dispatcher.capacity,
            aggregator: Arc::clone(&aggregator),
        };
        let processor_name = processor.name().to_string();

        let dispatcher = Dispatcher::from_config(&pool.dispatcher, processor)
            .context("Failed to create dispatcher")?;
        let policy = dispatcher.policy();
        let handle = DispatcherHandle::spawn(dispatcher, pool.dispatcher.queue_capacity);
        let submitter = handle.submitter();

        info!(
            source = %self.config.source,
            processor = %processor_name,
            capacity = pool.dispatcher.capacity,
            policy = ?policy,
            "Pipeline running"
        );

        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let stopped = tokio::select! {
            result = feed(&mut source, &submitter, policy) => result.map(|()| None),
            _ = shutdown => Ok(Some(RunOutcome::Interrupted)),
            _ = deadline => Ok(Some(RunOutcome::TimedOut)),
        };

        let fed = match stopped {
            Ok(None) => Ok(RunOutcome::Completed),
            Ok(Some(outcome)) => {
                warn!(outcome = %outcome, "Stopping pipeline, submitting quit");
                close_stream(&submitter).await.map(|()| outcome)
            }
            Err(e) => {
                // Deliver whatever is still buffered before reporting the failure
                if let Err(close_err) = close_stream(&submitter).await {
                    warn!(error = %close_err, "Final flush failed");
                }
                Err(e)
            }
        };

        // The worker only stops once every submitter is gone
        drop(submitter);
        info!("Shutting down pipeline...");
        let mut dispatcher = handle
            .shutdown()
            .await
            .context("Dispatcher worker failed")?;

        let (outcome, undelivered) = if dispatcher.state() == DispatcherState::Aborted {
            let reason = match fed {
                Err(e) => e.to_string(),
                Ok(_) => "invalid task".to_string(),
            };
            (RunOutcome::Aborted { reason }, dispatcher.take_undelivered())
        } else {
            (fed.context("Pipeline execution failed")?, Vec::new())
        };

        for task in &undelivered {
            warn!(kind = %task.kind(), payload = %task.payload(), "Task not delivered");
        }

        let batch_metrics = aggregator
            .lock()
            .map(|agg| agg.summary())
            .unwrap_or_default();

        let stats = PipelineStats {
            outcome,
            processor: processor_name,
            capacity: dispatcher.capacity(),
            duration: start_time.elapsed(),
            counters: dispatcher.metrics().snapshot(),
            batch_metrics,
            undelivered,
        };

        info!(
            outcome = %stats.outcome,
            batches = stats.counters.batches,
            delivered = stats.counters.delivered,
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Submit the quit sentinel unless the stream is already closed
async fn close_stream(submitter: &Submitter) -> Result<()> {
    match submitter.submit(Task::quit()).await {
        Ok(ack) => {
            debug!(?ack, "Quit accepted");
            Ok(())
        }
        Err(DispatcherError::StreamClosed { state }) => {
            debug!(%state, "Stream already closed");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Pump the source into the dispatcher until the stream completes
async fn feed(
    source: &mut TaskSource,
    submitter: &Submitter,
    policy: ValidationPolicy,
) -> Result<()> {
    loop {
        let item = match source.next().await? {
            Some(item) => item,
            None => {
                info!("Task source exhausted, submitting quit");
                Inbound::Task(Task::quit())
            }
        };

        match submitter.submit(item).await {
            Ok(Ack::Completed { final_batch }) => {
                debug!(final_batch, "Stream completed");
                return Ok(());
            }
            Ok(_) => {}
            Err(DispatcherError::InvalidTask { found })
                if policy == ValidationPolicy::Skip =>
            {
                debug!(found = %found, "Invalid task skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Processor wrapper feeding per-batch aggregates
struct StatsProcessor<P> {
    inner: P,
    capacity: usize,
    aggregator: Arc<Mutex<BatchMetricsAggregator>>,
}

impl<P: BatchProcessor> BatchProcessor for StatsProcessor<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn process(&mut self, batch: Vec<Task>) -> Result<(), ContractError> {
        let reason = if batch.len() == self.capacity {
            FlushReason::Full
        } else {
            FlushReason::Final
        };
        let kinds: Vec<String> = batch.iter().map(|t| t.kind().to_string()).collect();

        let started = Instant::now();
        self.inner.process(batch).await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Ok(mut aggregator) = self.aggregator.lock() {
            aggregator.update(reason, kinds.iter().map(String::as_str), latency_ms);
        }
        Ok(())
    }
}
