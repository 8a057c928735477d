use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::formatter::{LogStackFormatter, RawRecord};
use crate::handler::{BatchHandler, HandlerConfig};
use crate::queue::DispatchQueue;
use crate::sender::{ClientOptions, LogStackClient};

/// Fully wired pipeline: formatter, delivery client, dispatch queue worker
/// and batch handler assembled from one [`Config`].
///
/// Must be created inside a tokio runtime; the queue worker is spawned at
/// construction. Call [`close`](Self::close) on every exit path so the
/// final partial batch gets flushed and the worker drains.
pub struct LogShipper {
    handler: BatchHandler<LogStackClient, DispatchQueue>,
    client: LogStackClient,
    worker: JoinHandle<()>,
}

impl LogShipper {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let options = ClientOptions {
            request_timeout: config.request_timeout,
            ..ClientOptions::default()
        };
        let client = LogStackClient::new(&config.url, &config.token, options)?;
        let formatter = LogStackFormatter::new(
            &config.service_name,
            &config.environment,
            config.default_labels.clone(),
        );
        let (queue, worker) = DispatchQueue::start(client.clone(), config.retry.clone());
        let handler_config = HandlerConfig {
            batch_size: config.batch_size,
            batch_timeout: config.batch_timeout,
            async_dispatch: config.async_dispatch,
            queue_connection: config.queue_connection.clone(),
        };
        let handler = BatchHandler::new(formatter, client.clone(), queue, handler_config);

        info!(
            service = %config.service_name,
            environment = %config.environment,
            async_dispatch = config.async_dispatch,
            "log shipper initialized"
        );

        Ok(Self {
            handler,
            client,
            worker,
        })
    }

    /// Formats, buffers and possibly flushes one record. Never fails: all
    /// delivery problems stay contained in the pipeline.
    pub async fn log(&mut self, record: RawRecord) {
        self.handler.handle(record).await;
    }

    pub async fn flush(&mut self) {
        self.handler.flush().await;
    }

    /// Connectivity probe against the service's health endpoint.
    pub async fn ping(&self) -> bool {
        self.client.ping().await
    }

    pub fn buffered(&self) -> usize {
        self.handler.buffered()
    }

    /// Flushes the partial batch, then shuts the worker down after it has
    /// drained everything already enqueued.
    pub async fn close(mut self) {
        self.handler.close().await;
        let Self {
            handler, worker, ..
        } = self;
        // Dropping the handler drops the last queue sender, which lets the
        // worker loop exit once the channel is drained.
        drop(handler);
        let _ = worker.await;
    }
}
