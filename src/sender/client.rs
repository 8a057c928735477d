use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ConfigError;
use crate::formatter::LogEntry;

pub const INGEST_PATH: &str = "/v1/logs:ingest";
pub const HEALTH_PATH: &str = "/healthz";

/// The health probe uses its own short deadline, independent of the main
/// request timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("ingestion rejected with HTTP {status}")]
    Http { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Transport overrides for the delivery client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("logstack-shipper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parsed ingestion response. Empty or non-JSON bodies decode to an empty
/// object since delivery already succeeded by then.
pub type IngestResponse = serde_json::Map<String, Value>;

#[derive(Serialize)]
struct IngestRequest<'a> {
    entries: &'a [LogEntry],
}

/// HTTP transport to the LogStack ingestion service.
///
/// Stateless per call beyond its fixed configuration; safe to share across
/// concurrent callers. Performs no retry of its own: retrying is the
/// caller's or the queue job's responsibility.
#[derive(Debug, Clone)]
pub struct LogStackClient {
    http: Client,
    base_url: String,
    token: String,
}

impl LogStackClient {
    /// Fails fast on a missing or malformed endpoint or token; a client
    /// that constructed successfully never fails for configuration reasons
    /// at send time.
    pub fn new(base_url: &str, token: &str, options: ClientOptions) -> Result<Self, ConfigError> {
        if base_url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme);
        }

        let http = ClientBuilder::new()
            .timeout(options.request_timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                name: "http_client",
                value: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.token.is_empty()
    }

    /// POSTs `{"entries": [...]}` to the ingestion path. Any transport
    /// failure or non-2xx status is a terminal failure for this call.
    pub async fn ingest(
        &self,
        entries: &[LogEntry],
        batch_id: Option<&str>,
    ) -> Result<IngestResponse, DeliveryError> {
        let url = format!("{}{INGEST_PATH}", self.base_url);
        debug!(count = entries.len(), %url, "sending log entries");

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token)
            .json(&IngestRequest { entries });
        if let Some(id) = batch_id {
            request = request.header("X-Batch-Id", id);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "log ingestion rejected");
            return Err(DeliveryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        // Response parsing is best effort: the entries are already
        // delivered at this point.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    /// Lightweight health probe. True only for a 2xx; transport errors and
    /// error statuses yield false. Never fails.
    pub async fn ping(&self) -> bool {
        let url = format!("{}{HEALTH_PATH}", self.base_url);
        let request = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(PING_TIMEOUT);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(%error, "health probe failed");
                false
            }
        }
    }
}

fn classify(error: reqwest::Error) -> DeliveryError {
    if error.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Transport(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_separators_are_stripped_once_at_construction() {
        let client =
            LogStackClient::new("https://logs.example.com///", "abc123", ClientOptions::default())
                .unwrap();
        assert_eq!(client.base_url(), "https://logs.example.com");
    }

    #[test]
    fn construction_rejects_missing_configuration() {
        assert!(matches!(
            LogStackClient::new("", "abc", ClientOptions::default()),
            Err(ConfigError::MissingUrl)
        ));
        assert!(matches!(
            LogStackClient::new("https://logs.example.com", "", ClientOptions::default()),
            Err(ConfigError::MissingToken)
        ));
        assert!(matches!(
            LogStackClient::new("not a url", "abc", ClientOptions::default()),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            LogStackClient::new("ftp://logs.example.com", "abc", ClientOptions::default()),
            Err(ConfigError::UnsupportedScheme)
        ));
    }

    #[test]
    fn configured_check_requires_endpoint_and_credential() {
        let client =
            LogStackClient::new("https://logs.example.com", "abc123", ClientOptions::default())
                .unwrap();
        assert!(client.is_configured());
    }
}
