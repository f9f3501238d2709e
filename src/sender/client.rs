use super::stats::{ClientStats, ConnectionStats};
use crate::domain::{LogEntry, Metadata};
use crate::shipper::{Batch, ShipperConfig};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout: {0}")]
    RequestTimeout(String),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Outcome of a successful batch transmission.
#[derive(Debug, Clone)]
pub struct ShipmentReceipt {
    pub batch_id: String,
    pub entries: usize,
    pub bytes_sent: usize,
    pub status_code: u16,
    pub latency: Duration,
}

/// Batched wire shape: `POST {api_url}/api/ingest_log`.
#[derive(Serialize)]
struct BatchPayload<'a> {
    logs: &'a [LogEntry],
}

/// Single-entry wire shape: `POST {api_url}/api/ingest_single_log`.
///
/// Unlike the batched shape, metadata travels nested under a `metadata` key
/// and is omitted entirely when empty.
#[derive(Serialize)]
struct SinglePayload<'a> {
    service: &'a str,
    level: &'a str,
    message: &'a str,
    timestamp: &'a str,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: &'a Metadata,
}

/// HTTP client for the AppVital ingestion endpoint.
///
/// Owns a pooled reqwest client plus the resolved batch and single-entry
/// ingestion URLs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct IngestClient {
    client: Client,
    batch_url: Url,
    single_url: Url,
    timeout: Duration,
    stats: Arc<ClientStats>,
}

impl IngestClient {
    pub fn new(config: &ShipperConfig) -> Result<Self, ClientError> {
        let base_url: Url = config
            .api_url
            .parse()
            .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid API URL: {e}")))?;

        let batch_url = endpoint_url(&base_url, "api/ingest_log");
        let single_url = endpoint_url(&base_url, "api/ingest_single_log");

        let client = ClientBuilder::new()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            batch_url,
            single_url,
            timeout: config.request_timeout,
            stats: Arc::new(ClientStats::default()),
        })
    }

    /// Sends one batch as `{"logs": [...]}`. Any 2xx response counts as
    /// delivered; everything else is an error and the caller decides what
    /// to do with the batch (the shipper drops it).
    pub async fn send_batch(&self, batch: &Batch) -> Result<ShipmentReceipt, ClientError> {
        let payload = BatchPayload {
            logs: batch.entries(),
        };
        let body = serde_json::to_vec(&payload)?;
        let bytes_sent = body.len();
        let headers = self.batch_headers(batch)?;

        let start = Instant::now();
        let result = self
            .client
            .post(self.batch_url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                return Err(if e.is_timeout() {
                    ClientError::RequestTimeout(format!(
                        "Batch POST exceeded {:?}",
                        self.timeout
                    ))
                } else {
                    ClientError::Network(e)
                });
            }
        };

        let latency = start.elapsed();
        let status = response.status();
        self.stats.record_request(status.is_success(), latency);

        if status.is_success() {
            debug!(
                batch_id = batch.id(),
                status = status.as_u16(),
                bytes_sent,
                "ingestion endpoint accepted batch"
            );
            Ok(ShipmentReceipt {
                batch_id: batch.id().to_string(),
                entries: batch.size(),
                bytes_sent,
                status_code: status.as_u16(),
                latency,
            })
        } else {
            Err(ClientError::HttpError {
                status: status.as_u16(),
                message: format!("Ingestion endpoint rejected batch: {status}"),
            })
        }
    }

    /// Sends one entry through the companion single-entry endpoint, for
    /// callers that bypass batching.
    pub async fn send_single(&self, entry: &LogEntry) -> Result<(), ClientError> {
        let payload = SinglePayload {
            service: &entry.service,
            level: &entry.level,
            message: &entry.message,
            timestamp: &entry.timestamp,
            metadata: &entry.metadata,
        };

        let start = Instant::now();
        let result = self
            .client
            .post(self.single_url.clone())
            .json(&payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                return Err(if e.is_timeout() {
                    ClientError::RequestTimeout(format!(
                        "Single-entry POST exceeded {:?}",
                        self.timeout
                    ))
                } else {
                    ClientError::Network(e)
                });
            }
        };

        let status = response.status();
        self.stats.record_request(status.is_success(), start.elapsed());

        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::HttpError {
                status: status.as_u16(),
                message: format!("Ingestion endpoint rejected entry: {status}"),
            })
        }
    }

    pub fn batch_endpoint(&self) -> &Url {
        &self.batch_url
    }

    pub fn single_endpoint(&self) -> &Url {
        &self.single_url
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.stats.snapshot()
    }

    fn batch_headers(&self, batch: &Batch) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers.insert(
            HeaderName::from_static("x-batch-id"),
            HeaderValue::from_str(batch.id())
                .map_err(|e| ClientError::InvalidHeaderValue(format!("Invalid batch ID: {e}")))?,
        );

        headers.insert(
            HeaderName::from_static("x-batch-size"),
            HeaderValue::from_str(&batch.size().to_string())
                .map_err(|e| ClientError::InvalidHeaderValue(format!("Invalid batch size: {e}")))?,
        );

        headers.insert(
            HeaderName::from_static("x-flush-trigger"),
            HeaderValue::from_static(batch.trigger().as_str()),
        );

        Ok(headers)
    }
}

/// Appends `path` to the base URL's path, preserving any path prefix the
/// configured API URL carries.
fn endpoint_url(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = if url.path().ends_with('/') {
        format!("{}{path}", url.path())
    } else {
        format!("{}/{path}", url.path())
    };
    url.set_path(&joined);
    url
}
