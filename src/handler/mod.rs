use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::formatter::{Batch, LogEntry, LogStackFormatter, RawRecord};
use crate::queue::BatchQueue;
use crate::sender::Sink;

/// Batching and dispatch parameters for one handler instance.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub async_dispatch: bool,
    pub queue_connection: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_timeout: Duration::from_millis(5000),
            async_dispatch: false,
            queue_connection: "default".to_string(),
        }
    }
}

/// Buffers formatted entries and decides when and how to flush them.
///
/// Not safe for concurrent mutation: `handle` and `flush` read-modify-write
/// the buffer and the last-flush timestamp through `&mut self`. Sharing one
/// handler across tasks requires an external mutex; the usual discipline is
/// one handler per worker.
///
/// The timeout check runs only on the next `handle` call. A batch can sit
/// past its deadline while no records arrive; this latency bound is the
/// price of having no internal timer task.
pub struct BatchHandler<S, Q> {
    formatter: LogStackFormatter,
    sink: S,
    queue: Q,
    config: HandlerConfig,
    buffer: Vec<LogEntry>,
    last_flush: Instant,
}

impl<S: Sink, Q: BatchQueue> BatchHandler<S, Q> {
    pub fn new(formatter: LogStackFormatter, sink: S, queue: Q, config: HandlerConfig) -> Self {
        Self {
            formatter,
            sink,
            queue,
            config,
            buffer: Vec::new(),
            last_flush: Instant::now(),
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Formats and buffers one record. A buffer that sat past its deadline
    /// is flushed before the record is appended; hitting the size threshold
    /// flushes afterwards.
    ///
    /// Delivery problems never surface to the caller.
    pub async fn handle(&mut self, record: RawRecord) {
        if !self.buffer.is_empty() && self.last_flush.elapsed() > self.config.batch_timeout {
            self.flush().await;
        }
        self.buffer.push(self.formatter.format(record));
        if self.buffer.len() >= self.config.batch_size {
            self.flush().await;
        }
    }

    /// Dispatches the buffered entries per the configured mode. No-op on an
    /// empty buffer.
    ///
    /// The buffer is snapshotted and cleared up front; ownership of the
    /// snapshot moves to the dispatch path, and a failed dispatch never
    /// re-buffers. In async mode an enqueue failure gets exactly one direct
    /// delivery fallback before the batch is dropped.
    pub async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = Batch::new(std::mem::take(&mut self.buffer));
        debug!(
            batch_id = batch.id(),
            entries = batch.len(),
            async_dispatch = self.config.async_dispatch,
            "flushing log batch"
        );

        if !self.config.async_dispatch {
            match self.sink.deliver(&batch).await {
                Ok(()) => self.last_flush = Instant::now(),
                Err(error) => {
                    error!(
                        %error,
                        batch_id = batch.id(),
                        entries = batch.len(),
                        "log batch delivery failed, dropping batch"
                    );
                }
            }
            return;
        }

        match self.queue.enqueue(batch, &self.config.queue_connection) {
            Ok(()) => self.last_flush = Instant::now(),
            Err(error) => {
                error!(%error, "batch enqueue failed, attempting direct delivery fallback");
                let batch = error.into_batch();
                match self.sink.deliver(&batch).await {
                    Ok(()) => self.last_flush = Instant::now(),
                    Err(error) => {
                        error!(
                            %error,
                            batch_id = batch.id(),
                            entries = batch.len(),
                            "fallback delivery failed, dropping batch"
                        );
                    }
                }
            }
        }
    }

    /// Flushes any partial batch. Owners must call this on every exit path
    /// before discarding the handler; there is no implicit flush on drop.
    pub async fn close(&mut self) {
        self.flush().await;
    }
}
