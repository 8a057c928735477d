mod job;

pub use job::ProcessLogBatch;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::formatter::Batch;
use crate::retry::RetryPolicy;
use crate::sender::{DeliveryError, Sink};

/// Bounded hand-off capacity between the handler and the worker task.
const QUEUE_CAPACITY: usize = 1024;

/// The rejected batch rides along so the caller can fall back to direct
/// delivery without cloning every enqueue.
#[derive(Error, Debug)]
pub enum EnqueueError {
    #[error("dispatch queue is closed")]
    Closed(Batch),
    #[error("dispatch queue is full")]
    Full(Batch),
}

impl EnqueueError {
    pub fn into_batch(self) -> Batch {
        match self {
            Self::Closed(batch) | Self::Full(batch) => batch,
        }
    }
}

/// Hand-off capability the batch handler dispatches through in async mode.
/// Implementations must not block on the network.
pub trait BatchQueue: Send + Sync {
    fn enqueue(&self, batch: Batch, connection: &str) -> Result<(), EnqueueError>;
}

/// Invoked after a job exhausts its retry budget; the batch is dropped
/// afterwards.
pub type FailureHook = Box<dyn Fn(&Batch, &DeliveryError) + Send + Sync>;

/// In-process dispatch queue backed by a bounded tokio channel.
///
/// Batches enqueued here are delivered out-of-band by the worker task, with
/// re-attempts governed by the retry policy. The enqueuer has no visibility
/// into eventual delivery.
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<ProcessLogBatch>,
}

impl DispatchQueue {
    /// Creates the queue and spawns its worker on the current runtime. The
    /// default terminal-failure hook reports the dropped batch through
    /// `tracing`.
    pub fn start<S>(sink: S, policy: RetryPolicy) -> (Self, JoinHandle<()>)
    where
        S: Sink + 'static,
    {
        Self::start_with_hook(
            sink,
            policy,
            Box::new(|batch, error| {
                error!(
                    %error,
                    batch_id = batch.id(),
                    entries = batch.len(),
                    "log batch permanently failed, dropping"
                );
            }),
        )
    }

    pub fn start_with_hook<S>(
        sink: S,
        policy: RetryPolicy,
        hook: FailureHook,
    ) -> (Self, JoinHandle<()>)
    where
        S: Sink + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<ProcessLogBatch>(QUEUE_CAPACITY);
        let handle = tokio::spawn(async move {
            info!("dispatch queue worker started");
            while let Some(job) = rx.recv().await {
                debug!(
                    batch_id = job.batch().id(),
                    connection = job.connection(),
                    "dispatch queue picked up batch"
                );
                if let Err(error) = job.run(&sink, &policy).await {
                    hook(job.batch(), &error);
                }
            }
            info!("dispatch queue worker stopped");
        });
        (Self { tx }, handle)
    }
}

impl BatchQueue for DispatchQueue {
    fn enqueue(&self, batch: Batch, connection: &str) -> Result<(), EnqueueError> {
        self.tx
            .try_send(ProcessLogBatch::new(batch, connection))
            .map_err(|error| match error {
                TrySendError::Full(job) => EnqueueError::Full(job.into_batch()),
                TrySendError::Closed(job) => EnqueueError::Closed(job.into_batch()),
            })
    }
}
