//! Rate-limited HTTP fetcher.
//!
//! This module streams one remote resource at a time, paced to a configured
//! bitrate, and reports every chunk to a [`TransferObserver`] that can also
//! end the transfer cooperatively.
//!
//! # Example
//!
//! ```no_run
//! use downonly_core::download::{Fetcher, StopReason, TransferObserver};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct Counter(AtomicU64);
//!
//! impl TransferObserver for Counter {
//!     fn should_stop(&self) -> Option<StopReason> {
//!         None
//!     }
//!     fn record(&self, bytes: u64) {
//!         self.0.fetch_add(bytes, Ordering::Relaxed);
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new()?;
//! let counter = Counter(AtomicU64::new(0));
//! let report = fetcher
//!     .fetch("https://example.com/big.iso", 5, "Mozilla/5.0", &counter)
//!     .await;
//! println!("read {} bytes", report.bytes);
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
mod fetcher;
mod observer;
mod throttle;

pub use constants::{CHUNK_SIZE, FETCH_TIMEOUT};
pub use error::FetchError;
pub use fetcher::{FetchOutcome, FetchReport, Fetcher};
pub use observer::{StopReason, TransferObserver};
pub use throttle::{Throttle, bytes_per_second};
