//! Streaming, throttled HTTP fetcher.
//!
//! The body is never stored: each chunk is counted, published to the
//! [`TransferObserver`] and dropped.

use std::io;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, USER_AGENT};
use tokio::io::AsyncReadExt;
use tokio::time::Instant;
use tokio_util::io::StreamReader;
use tracing::{debug, instrument};

use super::constants::{CHUNK_SIZE, FETCH_TIMEOUT};
use super::error::FetchError;
use super::observer::{StopReason, TransferObserver};
use super::throttle::Throttle;

/// How a transfer ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Body read to EOF.
    Completed,
    /// The observer asked to stop.
    Stopped(StopReason),
    /// Transport or status failure.
    Failed(FetchError),
}

/// Result of one [`Fetcher::fetch`] call.
#[derive(Debug)]
pub struct FetchReport {
    /// Bytes read before the transfer ended.
    pub bytes: u64,
    /// Why it ended.
    pub outcome: FetchOutcome,
}

impl FetchReport {
    fn failed(bytes: u64, error: FetchError) -> Self {
        Self {
            bytes,
            outcome: FetchOutcome::Failed(error),
        }
    }

    /// Returns the error if the transfer failed.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            FetchOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// HTTP fetcher, created once and reused for every attempt.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with the default one-hour transfer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    /// Creates a fetcher with an explicit overall transfer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Streams `target` at no more than `speed_limit_mbps`, reporting every
    /// chunk to `observer`.
    ///
    /// Never returns early with an error: failures are carried in the
    /// report together with the bytes read before them.
    #[instrument(skip(self, user_agent, observer), fields(url = %target))]
    pub async fn fetch(
        &self,
        target: &str,
        speed_limit_mbps: u32,
        user_agent: &str,
        observer: &dyn TransferObserver,
    ) -> FetchReport {
        let response = match self
            .client
            .get(target)
            .header(USER_AGENT, user_agent)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchReport::failed(0, FetchError::request(target, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchReport::failed(0, FetchError::http_status(target, status.as_u16()));
        }
        debug!(status = status.as_u16(), length = ?response.content_length(), "response headers received");

        let stream = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        let mut reader = StreamReader::new(Box::pin(stream));
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut throttle = Throttle::new(speed_limit_mbps, Instant::now());
        let mut total: u64 = 0;

        loop {
            if let Some(reason) = observer.should_stop() {
                debug!(bytes = total, ?reason, "transfer stopped");
                return FetchReport {
                    bytes: total,
                    outcome: FetchOutcome::Stopped(reason),
                };
            }

            let n = match reader.read(&mut buf).await {
                Ok(0) => {
                    debug!(bytes = total, "transfer complete");
                    return FetchReport {
                        bytes: total,
                        outcome: FetchOutcome::Completed,
                    };
                }
                Ok(n) => n as u64,
                Err(e) => return FetchReport::failed(total, FetchError::read(target, e)),
            };

            total += n;
            observer.record(n);
            throttle.throttle(n).await;
        }
    }
}
