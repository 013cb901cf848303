//! [`Store`] backed by pretty-printed JSON files in a data directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{PersistError, Store};
use crate::state::{Configuration, LogBook, Statistics};

/// Configuration record file name.
pub const CONFIG_FILE: &str = "config.json";
/// Statistics record file name.
pub const STATS_FILE: &str = "stats.json";
/// Operator log file name.
pub const LOGS_FILE: &str = "logs.json";

/// JSON file store rooted at one directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Creates a store over `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Reads one record. `None` when absent or unparsable.
    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.path(name);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "record not found");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read record, using defaults");
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse record, using defaults");
                None
            }
        }
    }

    /// Writes one record through a uniquely named temp file, renamed over
    /// the record once complete.
    fn write<T: Serialize>(&self, name: &str, record: &T) -> Result<(), PersistError> {
        let path = self.path(name);
        let data =
            serde_json::to_vec_pretty(record).map_err(|e| PersistError::encode(&path, e))?;

        fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(&self.dir, e))?;
        let mut temp = tempfile::Builder::new()
            .prefix(name)
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| PersistError::io(&self.dir, e))?;
        temp.write_all(&data)
            .map_err(|e| PersistError::io(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| PersistError::io(&path, e.error))?;
        debug!(path = %path.display(), bytes = data.len(), "record saved");
        Ok(())
    }
}

impl Store for JsonStore {
    fn load_config(&self) -> Configuration {
        if let Some(config) = self.read::<Configuration>(CONFIG_FILE) {
            if let Err(e) = config.validate() {
                warn!(error = %e, "stored configuration fails validation; keeping it as loaded");
            }
            return config;
        }

        let config = Configuration::default();
        if !self.path(CONFIG_FILE).exists() {
            info!(dir = %self.dir.display(), "writing default configuration");
            if let Err(e) = self.save_config(&config) {
                warn!(error = %e, "failed to write default configuration");
            }
        }
        config
    }

    fn save_config(&self, config: &Configuration) -> Result<(), PersistError> {
        self.write(CONFIG_FILE, config)
    }

    fn load_statistics(&self, today: NaiveDate) -> Statistics {
        self.read(STATS_FILE)
            .unwrap_or_else(|| Statistics::starting(today))
    }

    fn save_statistics(&self, stats: &Statistics) -> Result<(), PersistError> {
        self.write(STATS_FILE, stats)
    }

    fn load_logs(&self) -> LogBook {
        self.read::<LogBook>(LOGS_FILE)
            .map(LogBook::normalized)
            .unwrap_or_default()
    }

    fn save_logs(&self, logs: &LogBook) -> Result<(), PersistError> {
        self.write(LOGS_FILE, logs)
    }
}
