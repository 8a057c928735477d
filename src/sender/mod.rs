mod client;

pub use client::{ClientOptions, DeliveryError, IngestResponse, LogStackClient};

use crate::formatter::Batch;
use std::future::Future;

/// Delivery capability consumed by the batch handler and the queue worker.
/// [`LogStackClient`] is the production implementation; tests substitute
/// in-memory fakes.
pub trait Sink: Send + Sync {
    fn deliver(&self, batch: &Batch) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

impl Sink for LogStackClient {
    async fn deliver(&self, batch: &Batch) -> Result<(), DeliveryError> {
        self.ingest(batch.entries(), Some(batch.id())).await?;
        Ok(())
    }
}
