//! Human-readable rendering for operator log messages.

/// Maximum URL length shown in log messages before truncation.
const MAX_URL_DISPLAY_LEN: usize = 60;

/// Formats a byte count with decimal units (B, MB, GB, TB).
///
/// ```
/// use downonly_core::format::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1_500_000), "1.50 MB");
/// assert_eq!(format_bytes(2_000_000_000), "2.00 GB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    match bytes {
        1_000_000_000_000.. => format!("{:.2} TB", b / 1e12),
        1_000_000_000.. => format!("{:.2} GB", b / 1e9),
        1_000_000.. => format!("{:.2} MB", b / 1e6),
        _ => format!("{bytes} B"),
    }
}

/// Shortens long URLs to 57 characters plus `...`.
#[must_use]
pub fn truncate_url(url: &str) -> String {
    if url.chars().count() > MAX_URL_DISPLAY_LEN {
        let head: String = url.chars().take(MAX_URL_DISPLAY_LEN - 3).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}
