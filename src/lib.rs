#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned
)]
#![allow(
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. BatchHandler in handler module
    clippy::must_use_candidate        // Annotated selectively on critical APIs
)]

//! Log-shipping pipeline for the LogStack ingestion service.
//!
//! Raw records flow through [`formatter::LogStackFormatter`] into the
//! [`handler::BatchHandler`] buffer, which flushes size- or time-triggered
//! batches either directly through [`sender::LogStackClient`] or out-of-band
//! via the [`queue::DispatchQueue`] worker.

pub mod config;
pub mod formatter;
pub mod handler;
pub mod queue;
pub mod retry;
pub mod sender;
pub mod shipper;

// Re-export main types for easy access
pub use config::{Config, ConfigError};
pub use formatter::{Batch, ContextValue, LogEntry, LogStackFormatter, RawRecord, Severity, SourceLevel};
pub use handler::{BatchHandler, HandlerConfig};
pub use queue::{BatchQueue, DispatchQueue, EnqueueError, ProcessLogBatch};
pub use retry::RetryPolicy;
pub use sender::{ClientOptions, DeliveryError, LogStackClient, Sink};
pub use shipper::LogShipper;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
