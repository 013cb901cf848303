//! Process wiring: load records, spawn the background tasks, serve the
//! control API and flush on shutdown.

mod autosave;
mod runtime;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub use autosave::{AUTOSAVE_INTERVAL, run_autosave};
pub use runtime::{run, shutdown_signal};

/// Default control API port.
pub const DEFAULT_PORT: u16 = 9999;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// Address the control API binds to.
    pub bind: IpAddr,
    /// Control API port.
    pub port: u16,
    /// Directory holding the JSON records.
    pub data_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl AppSettings {
    /// Socket address for the control API.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.listen_addr().to_string(), "0.0.0.0:9999");
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }
}
