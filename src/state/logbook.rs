//! Bounded operator log shown by the control surface.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of retained entries.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// One operator-facing log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// Human-readable message.
    #[serde(rename = "msg")]
    pub message: String,
}

/// Ring of the most recent [`LogEntry`] values, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBook {
    /// Maximum retained entries; zero in a stored record means the default.
    #[serde(rename = "max_entries", default)]
    capacity: usize,
    #[serde(default)]
    entries: VecDeque<LogEntry>,
}

impl Default for LogBook {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBook {
    /// Creates an empty log keeping at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Repairs a record loaded from disk: zero capacity falls back to the
    /// default and excess entries are trimmed.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.capacity == 0 {
            self.capacity = DEFAULT_LOG_CAPACITY;
        }
        self.trim();
        self
    }

    /// Appends an entry, evicting the oldest beyond capacity.
    pub fn append(&mut self, time: impl Into<String>, message: impl Into<String>) {
        self.entries.push_back(LogEntry {
            time: time.into(),
            message: message.into(),
        });
        self.trim();
    }

    /// Maximum retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}
