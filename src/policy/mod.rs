//! Policy evaluation: schedule window, daily quota and day rollover.
//!
//! Everything here is a pure function over a snapshot. The worker and the
//! speed tracker call into it while holding the shared-state lock, so none of
//! these functions block or allocate beyond the statistics map itself.

mod rollover;
mod schedule;

pub use rollover::rollover_if_needed;
pub use schedule::{in_schedule, minutes_of_day, parse_time_of_day};

/// Bytes per quota gigabyte (decimal).
pub const BYTES_PER_GB: u64 = 1_000_000_000;

/// Returns whether `today_bytes` has used up a quota of `daily_quota_gb`.
///
/// A quota of zero is always reached.
#[must_use]
pub fn quota_reached(today_bytes: u64, daily_quota_gb: u64) -> bool {
    today_bytes >= daily_quota_gb.saturating_mul(BYTES_PER_GB)
}
