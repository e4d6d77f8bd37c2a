//! DispatcherHandle - runs a dispatcher on its own task behind a channel
//!
//! The dispatcher itself has no locking. When several producers need to
//! feed one dispatcher, the handle serializes their submissions through a
//! bounded mpsc queue; each submission waits for its own reply, so
//! `submit` still returns only after any flush it triggered.

use std::sync::Arc;

use contracts::{BatchProcessor, Inbound};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::dispatcher::{Ack, Dispatcher};
use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

type Reply = oneshot::Sender<Result<Ack, DispatcherError>>;

struct Envelope {
    item: Inbound,
    reply: Reply,
}

/// Cloneable producer-side endpoint
#[derive(Clone)]
pub struct Submitter {
    tx: mpsc::Sender<Envelope>,
}

impl Submitter {
    /// Submit one item and wait for the dispatcher's answer
    pub async fn submit(&self, item: impl Into<Inbound>) -> Result<Ack, DispatcherError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                item: item.into(),
                reply,
            })
            .await
            .map_err(|_| DispatcherError::worker_gone("input queue closed"))?;

        rx.await
            .map_err(|_| DispatcherError::worker_gone("reply dropped"))?
    }
}

/// Handle to a dispatcher running on a background task
pub struct DispatcherHandle<P> {
    submitter: Submitter,
    metrics: Arc<DispatchMetrics>,
    worker_handle: JoinHandle<Dispatcher<P>>,
}

impl<P> DispatcherHandle<P>
where
    P: BatchProcessor + 'static,
{
    /// Move `dispatcher` onto a new task fed by a queue of `queue_capacity`
    pub fn spawn(dispatcher: Dispatcher<P>, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::clone(dispatcher.metrics());

        let worker_handle = tokio::spawn(dispatcher_worker(dispatcher, rx));

        Self {
            submitter: Submitter { tx },
            metrics,
            worker_handle,
        }
    }

    /// A new producer endpoint
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Submit through the handle's own endpoint
    pub async fn submit(&self, item: impl Into<Inbound>) -> Result<Ack, DispatcherError> {
        self.submitter.submit(item).await
    }

    /// Get live counters
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Stop the worker and get the dispatcher back
    ///
    /// Waits until every outstanding [`Submitter`] has been dropped.
    #[instrument(name = "dispatcher_handle_shutdown", skip(self))]
    pub async fn shutdown(self) -> Result<Dispatcher<P>, DispatcherError> {
        drop(self.submitter);
        self.worker_handle.await.map_err(|e| {
            error!(error = ?e, "Dispatcher worker panicked");
            DispatcherError::worker_gone(e.to_string())
        })
    }
}

/// Worker task draining the submission queue in arrival order
#[instrument(name = "dispatcher_worker_loop", skip_all)]
async fn dispatcher_worker<P: BatchProcessor>(
    mut dispatcher: Dispatcher<P>,
    mut rx: mpsc::Receiver<Envelope>,
) -> Dispatcher<P> {
    debug!("Dispatcher worker started");

    while let Some(Envelope { item, reply }) = rx.recv().await {
        let result = dispatcher.submit(item).await;
        // The producer may have stopped waiting
        let _ = reply.send(result);
    }

    debug!(state = %dispatcher.state(), "Dispatcher worker stopped");
    dispatcher
}
