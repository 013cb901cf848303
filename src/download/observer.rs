//! Hooks the fetcher uses to report progress and learn when to stop.

/// Why a transfer ended before EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Operator intent went off.
    Disabled,
    /// Today's quota was used up mid-transfer.
    QuotaReached,
}

/// Receives byte counts from an in-flight transfer and decides when it ends.
///
/// Implementations must be cheap: both methods run once per chunk.
pub trait TransferObserver: Send + Sync {
    /// Consulted before every chunk read. `Some` ends the transfer cleanly.
    fn should_stop(&self) -> Option<StopReason>;

    /// Publishes `bytes` just read from the body.
    fn record(&self, bytes: u64);
}
