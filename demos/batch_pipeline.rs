//! Batch Pipeline Example
//!
//! A producer task emits `Task1..Task10` every 100ms, then the quit
//! sentinel. Tasks are grouped two at a time and each batch is handed to a
//! per-task handler that prints it. With a config path as first argument,
//! the dispatcher and processor come from that file instead.
//!
//! Run with: cargo run -p batch_pipeline [config.toml]

use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::Task;
use dispatcher::{
    create_dispatcher, Ack, Dispatcher, DispatcherHandle, PerTaskProcessor, Submitter,
};
use observability::{LogFormat, ObservabilityConfig};

const TASK_COUNT: u64 = 10;
const INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging, no metrics endpoint
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        metrics_port: None,
        ..Default::default()
    })?;

    tracing::info!("Starting Batch Pipeline Demo");

    if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading pool config");
        let config = ConfigLoader::load_from_path(std::path::Path::new(&path))?;
        let handle = DispatcherHandle::spawn(
            create_dispatcher(&config)?,
            config.dispatcher.queue_capacity,
        );
        produce(handle.submitter()).await?;
        let dispatcher = handle.shutdown().await?;
        tracing::info!(stats = ?dispatcher.metrics().snapshot(), "Demo finished");
        return Ok(());
    }

    let processor = PerTaskProcessor::new("printer", |task: Task| {
        println!("Processing: {} ({})", task.kind(), task.payload());
        Ok(())
    });
    let handle = DispatcherHandle::spawn(Dispatcher::new(2, processor)?, 16);

    produce(handle.submitter()).await?;

    let dispatcher = handle.shutdown().await?;
    let stats = dispatcher.metrics().snapshot();
    tracing::info!(
        batches = stats.batches,
        delivered = stats.delivered,
        "Demo finished"
    );

    Ok(())
}

/// Producer: numbered tasks on a fixed interval, then quit
async fn produce(submitter: Submitter) -> Result<(), dispatcher::DispatcherError> {
    let producer = tokio::spawn(async move {
        for n in 1..=TASK_COUNT {
            let ack = submitter.submit(Task::new(format!("Task{n}"), n)).await?;
            if let Ack::Flushed { batch_len } = ack {
                tracing::info!(batch_len, "Batch processed");
            }
            tokio::time::sleep(INTERVAL).await;
        }
        tracing::info!("Producer finished, sending quit");
        submitter.submit(Task::quit()).await
    });

    let ack = producer
        .await
        .map_err(|e| dispatcher::DispatcherError::worker_gone(e.to_string()))??;
    tracing::info!(?ack, "Stream closed");
    Ok(())
}
