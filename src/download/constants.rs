//! Constants for the download module (timeouts, buffer sizes).

use std::time::Duration;

/// Overall timeout for one transfer, connection setup included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Body read buffer size (32 KiB).
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Length of the throttle window.
pub const THROTTLE_WINDOW: Duration = Duration::from_secs(1);
