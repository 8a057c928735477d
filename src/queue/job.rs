use tracing::warn;

use crate::formatter::Batch;
use crate::retry::RetryPolicy;
use crate::sender::{DeliveryError, Sink};

/// One queued unit of work: an immutable snapshot of entries bound for the
/// ingestion endpoint, tagged with the queue connection it was dispatched
/// on.
#[derive(Debug, Clone)]
pub struct ProcessLogBatch {
    batch: Batch,
    connection: String,
}

impl ProcessLogBatch {
    pub fn new(batch: Batch, connection: impl Into<String>) -> Self {
        Self {
            batch,
            connection: connection.into(),
        }
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn into_batch(self) -> Batch {
        self.batch
    }

    /// Single delivery attempt. The error propagates so the queue's retry
    /// mechanism can reschedule the job.
    pub async fn execute<S: Sink>(&self, sink: &S) -> Result<(), DeliveryError> {
        sink.deliver(&self.batch).await.map_err(|error| {
            warn!(
                %error,
                batch_id = self.batch.id(),
                entries = self.batch.len(),
                connection = %self.connection,
                "log batch delivery attempt failed"
            );
            error
        })
    }

    /// Runs the job to completion under `policy`: deliver, sleep the
    /// per-attempt delay after a failure, give up once the attempt budget
    /// is spent. Returns the last error on exhaustion.
    pub async fn run<S: Sink>(&self, sink: &S, policy: &RetryPolicy) -> Result<(), DeliveryError> {
        let mut failed_attempts = 0u32;
        loop {
            match self.execute(sink).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    failed_attempts += 1;
                    match policy.delay_before(failed_attempts) {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => return Err(error),
                    }
                }
            }
        }
    }
}
