//! Persistence gateway for configuration, statistics and the operator log.
//!
//! Loads never fail: a missing or unreadable record falls back to its
//! default (with a `warn!` when the file exists but cannot be parsed).
//! Saves report a [`PersistError`] that callers log and otherwise ignore;
//! the in-memory state stays authoritative.

mod json;
mod recorder;

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::state::{Configuration, LogBook, Statistics};

pub use json::{CONFIG_FILE, JsonStore, LOGS_FILE, STATS_FILE};
pub use recorder::Recorder;

/// Errors raised while writing a record.
#[derive(Debug, Error)]
pub enum PersistError {
    /// File system error (create directory, write, rename).
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded.
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

impl PersistError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an encoding error.
    pub fn encode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }
}

/// Durable storage for the agent's three records.
///
/// Implementations are blocking; async callers go through
/// `tokio::task::spawn_blocking`.
pub trait Store: Send + Sync {
    /// Loads the configuration, or the default when absent or unreadable.
    fn load_config(&self) -> Configuration;

    /// Saves the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the record cannot be written.
    fn save_config(&self, config: &Configuration) -> Result<(), PersistError>;

    /// Loads statistics, or a fresh record dated `today`.
    fn load_statistics(&self, today: NaiveDate) -> Statistics;

    /// Saves statistics.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the record cannot be written.
    fn save_statistics(&self, stats: &Statistics) -> Result<(), PersistError>;

    /// Loads the operator log, or an empty one with the default capacity.
    fn load_logs(&self) -> LogBook;

    /// Saves the operator log.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the record cannot be written.
    fn save_logs(&self, logs: &LogBook) -> Result<(), PersistError>;
}
