//! Error types for the download module.

use thiserror::Error;

/// Errors that end a transfer early.
///
/// None of these are fatal to the agent: the worker logs them with the
/// partial byte count and moves on to its cooldown.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request could not be sent or the response headers never arrived
    /// (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Target URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Body stream failed after the transfer started.
    #[error("read error from {url}: {source}")]
    Read {
        /// Target URL.
        url: String,
        /// The underlying stream error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates a request error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a body read error.
    pub fn read(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    /// Whether the request hit the overall transfer timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request { source, .. } | Self::Client(source) => source.is_timeout(),
            Self::Read { source, .. } => source.kind() == std::io::ErrorKind::TimedOut,
            Self::HttpStatus { .. } => false,
        }
    }
}
