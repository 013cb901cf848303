//! CLI argument definitions using clap derive macros.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use downonly_core::app::{AppSettings, DEFAULT_DATA_DIR, DEFAULT_PORT};

/// Background traffic generator.
///
/// Downloads configured resources on a daily schedule, throttled to a fixed
/// bitrate and capped by a daily quota, discarding the payload. Controlled
/// through a small JSON API.
#[derive(Parser, Debug)]
#[command(name = "downonly")]
#[command(author, version, about)]
pub struct Args {
    /// Control API port
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address the control API binds to
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Directory holding config.json, stats.json and logs.json
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Process settings for the runtime.
    pub fn settings(&self) -> AppSettings {
        AppSettings {
            bind: self.bind,
            port: self.port,
            data_dir: self.data_dir.clone(),
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
