//! downonly core library
//!
//! A background agent that generates download traffic: it repeatedly pulls
//! configured remote resources, throttled to a fixed bitrate, restricted to a
//! daily time window and capped by a daily byte quota. Payload bytes are
//! counted and discarded.
//!
//! # Architecture
//!
//! - [`policy`] - schedule window, quota and day rollover (pure functions)
//! - [`download`] - rate-limited streaming fetcher
//! - [`state`] - shared runtime state behind a single lock
//! - [`worker`] - evaluate / download / cool down loop
//! - [`tracker`] - per-second throughput sampling
//! - [`persistence`] - JSON record storage
//! - [`control`] and [`api`] - operator operations and their HTTP routes
//! - [`app`] - process wiring and shutdown

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod app;
pub mod clock;
pub mod control;
pub mod download;
pub mod format;
pub mod persistence;
pub mod policy;
pub mod random;
pub mod state;
pub mod tracker;
pub mod user_agent;
pub mod worker;

// Re-export commonly used types
pub use control::{ControlSurface, ToggleResponse};
pub use download::{FetchError, FetchOutcome, FetchReport, Fetcher, StopReason, TransferObserver};
pub use persistence::{JsonStore, PersistError, Recorder, Store};
pub use state::{ConfigError, Configuration, Phase, SharedState, Statistics};
pub use worker::{Worker, WorkerSettings};
