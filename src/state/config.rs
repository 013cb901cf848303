//! Operator policy: speed cap, daily quota, schedule window and targets.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::policy::parse_time_of_day;

/// Sample target used when no configuration exists yet.
pub const DEFAULT_TARGET: &str = "http://updates-http.cdn-apple.com/2019WinterFCS/fullrestores/041-39257/32129B6C-292C-11E9-9E72-4511412B0A59/iPhone_4.7_12.1.4_16D57_Restore.ipsw";

/// Download policy, replaced as a whole by the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Throughput cap in megabits per second.
    pub speed_limit_mbps: u32,
    /// Daily transfer cap in (decimal) gigabytes.
    pub daily_quota_gb: u64,
    /// Start of the daily window, `HH:MM`.
    pub schedule_start: String,
    /// End of the daily window, `HH:MM`. Earlier than the start wraps midnight.
    pub schedule_end: String,
    /// Resources to pull from, chosen at random per attempt.
    #[serde(rename = "urls", default)]
    pub targets: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            speed_limit_mbps: 5,
            daily_quota_gb: 200,
            schedule_start: "00:00".to_string(),
            schedule_end: "23:59".to_string(),
            targets: vec![DEFAULT_TARGET.to_string()],
        }
    }
}

/// Reasons a configuration update is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Payload is not a JSON configuration object.
    #[error("malformed configuration payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Speed limit must be at least 1 Mbit/s.
    #[error("speed_limit_mbps must be positive")]
    ZeroSpeedLimit,

    /// Schedule bound is not `HH:MM`.
    #[error("invalid {field} {value:?}: expected HH:MM")]
    InvalidTime {
        /// Which bound failed.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Target is not an absolute http(s) URL.
    #[error("invalid target URL {url:?}")]
    InvalidTarget {
        /// The rejected URL.
        url: String,
    },
}

impl Configuration {
    /// Parses and validates a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the payload does not deserialize or any
    /// field fails [`validate`](Self::validate).
    pub fn from_json(payload: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field ranges and formats.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_limit_mbps == 0 {
            return Err(ConfigError::ZeroSpeedLimit);
        }
        for (field, value) in [
            ("schedule_start", &self.schedule_start),
            ("schedule_end", &self.schedule_end),
        ] {
            if parse_time_of_day(value).is_none() {
                return Err(ConfigError::InvalidTime {
                    field,
                    value: value.clone(),
                });
            }
        }
        for target in &self.targets {
            let valid = Url::parse(target)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
            if !valid {
                return Err(ConfigError::InvalidTarget {
                    url: target.clone(),
                });
            }
        }
        Ok(())
    }
}
