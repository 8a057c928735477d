use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::retry::RetryPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("LogStack URL not configured")]
    MissingUrl,
    #[error("LogStack token not configured")]
    MissingToken,
    #[error("Invalid LogStack URL: {0}")]
    InvalidUrl(String),
    #[error("LogStack URL must use http:// or https://")]
    UnsupportedScheme,
    #[error("LogStack token must be alphanumeric")]
    InvalidToken,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Full configuration surface consumed by the pipeline. Validation happens
/// once, at construction of the client or shipper, never at send time.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub token: String,
    pub service_name: String,
    pub environment: String,
    /// Hand flushed batches to the queue worker instead of delivering
    /// inline.
    pub async_dispatch: bool,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub queue_connection: String,
    /// Labels attached to every entry unless overridden by extraction.
    /// Empty-valued defaults are dropped.
    pub default_labels: Vec<(String, String)>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            service_name: "app".to_string(),
            environment: "production".to_string(),
            async_dispatch: true,
            batch_size: 50,
            batch_timeout: Duration::from_millis(5000),
            queue_connection: "default".to_string(),
            default_labels: Vec::new(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let parsed = Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme);
        }
        if !self.token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidToken);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "batch_size",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Builds a validated configuration from `LOGSTACK_*` environment
    /// variables, with the documented defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = env::var("LOGSTACK_URL") {
            config.url = url;
        }
        if let Ok(token) = env::var("LOGSTACK_TOKEN") {
            config.token = token;
        }
        if let Ok(service) = env::var("LOGSTACK_SERVICE") {
            config.service_name = service;
        }
        if let Ok(environment) = env::var("LOGSTACK_ENV") {
            config.environment = environment;
        }
        if let Ok(raw) = env::var("LOGSTACK_ASYNC") {
            config.async_dispatch = parse_var("LOGSTACK_ASYNC", &raw)?;
        }
        if let Ok(raw) = env::var("LOGSTACK_BATCH_SIZE") {
            config.batch_size = parse_var("LOGSTACK_BATCH_SIZE", &raw)?;
        }
        if let Ok(raw) = env::var("LOGSTACK_BATCH_TIMEOUT") {
            config.batch_timeout = Duration::from_millis(parse_var("LOGSTACK_BATCH_TIMEOUT", &raw)?);
        }
        if let Ok(queue) = env::var("LOGSTACK_QUEUE") {
            config.queue_connection = queue;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}
