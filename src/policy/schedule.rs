//! Daily schedule window checks.

use chrono::{NaiveTime, Timelike};

/// Converts `HH:MM` into minutes past midnight, leniently.
///
/// Anything that is not two `:`-separated fields yields 0 (midnight), and a
/// field that is not a number counts as 0. Configuration is validated with
/// [`parse_time_of_day`] before it is stored, so this path only matters for
/// hand-edited config files.
#[must_use]
pub fn minutes_of_day(value: &str) -> u32 {
    let mut parts = value.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(hours), Some(minutes), None) => {
            let hours: u32 = hours.parse().unwrap_or(0);
            let minutes: u32 = minutes.parse().unwrap_or(0);
            hours.saturating_mul(60).saturating_add(minutes)
        }
        _ => 0,
    }
}

/// Strictly parses `HH:MM` (hour 0-23, minute 0-59).
#[must_use]
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Returns whether `now` falls inside the window `[start, end]`.
///
/// Both bounds are inclusive at minute resolution. When `start > end` the
/// window wraps midnight. A zero-width window (`start == end`) means no
/// restriction at all.
#[must_use]
pub fn in_schedule(now: NaiveTime, start: &str, end: &str) -> bool {
    let now = now.hour() * 60 + now.minute();
    let start = minutes_of_day(start);
    let end = minutes_of_day(end);
    if start == end {
        true
    } else if start < end {
        now >= start && now <= end
    } else {
        now >= start || now <= end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_minutes_of_day_valid() {
        assert_eq!(minutes_of_day("00:00"), 0);
        assert_eq!(minutes_of_day("01:30"), 90);
        assert_eq!(minutes_of_day("23:59"), 1439);
    }

    #[test]
    fn test_minutes_of_day_malformed_is_midnight() {
        assert_eq!(minutes_of_day(""), 0);
        assert_eq!(minutes_of_day("noon"), 0);
        assert_eq!(minutes_of_day("12:00:00"), 0);
    }

    #[test]
    fn test_minutes_of_day_non_numeric_field_counts_as_zero() {
        assert_eq!(minutes_of_day("xx:30"), 30);
        assert_eq!(minutes_of_day("02:yy"), 120);
    }

    #[test]
    fn test_parse_time_of_day_strict() {
        assert_eq!(parse_time_of_day("23:00"), Some(t(23, 0)));
        assert!(parse_time_of_day("24:00").is_none());
        assert!(parse_time_of_day("12:60").is_none());
        assert!(parse_time_of_day("noon").is_none());
        assert!(parse_time_of_day("").is_none());
    }

    #[test]
    fn test_in_schedule_plain_window_includes_both_bounds() {
        assert!(in_schedule(t(9, 0), "09:00", "17:00"));
        assert!(in_schedule(t(17, 0), "09:00", "17:00"));
        assert!(in_schedule(t(12, 30), "09:00", "17:00"));
        assert!(!in_schedule(t(8, 59), "09:00", "17:00"));
        assert!(!in_schedule(t(17, 1), "09:00", "17:00"));
    }

    #[test]
    fn test_in_schedule_wraps_midnight() {
        assert!(in_schedule(t(23, 30), "23:00", "01:00"));
        assert!(in_schedule(t(0, 30), "23:00", "01:00"));
        assert!(in_schedule(t(23, 0), "23:00", "01:00"));
        assert!(in_schedule(t(1, 0), "23:00", "01:00"));
        assert!(!in_schedule(t(12, 0), "23:00", "01:00"));
        assert!(!in_schedule(t(1, 1), "23:00", "01:00"));
    }

    #[test]
    fn test_in_schedule_full_day_default() {
        for hour in 0..24 {
            assert!(in_schedule(t(hour, 0), "00:00", "23:59"));
        }
        assert!(in_schedule(t(23, 59), "00:00", "23:59"));
    }

    #[test]
    fn test_in_schedule_zero_width_window_is_always() {
        for minute in 0..(24 * 60) {
            let now = t(minute / 60, minute % 60);
            assert!(in_schedule(now, "08:00", "08:00"), "excluded {now}");
        }
    }

    #[test]
    fn test_in_schedule_malformed_bounds_fall_back_to_midnight() {
        // "garbage" -> 00:00, so the window is [00:00, 06:00]
        assert!(in_schedule(t(3, 0), "garbage", "06:00"));
        assert!(!in_schedule(t(7, 0), "garbage", "06:00"));
    }
}
