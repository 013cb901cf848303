//! Calendar-day rollover of the byte counters.

use chrono::{Datelike, NaiveDate};

use crate::state::Statistics;

/// Moves `stats` onto `today` if the calendar day has changed.
///
/// The previous day's counter is archived when it has a date and is non-zero.
/// Archived days from any other year than `today`'s are dropped, except
/// the day being archived right now: on New Year the closing day of the old
/// year survives until the next rollover. The live counter restarts at zero.
/// Returns `true` when a rollover happened; calling again on the same day is
/// a no-op.
pub fn rollover_if_needed(stats: &mut Statistics, today: NaiveDate) -> bool {
    if stats.today_date == Some(today) {
        return false;
    }

    let year = today.year();
    stats.daily.retain(|date, _| date.year() == year);

    if let Some(previous) = stats.today_date
        && stats.today_bytes > 0
    {
        stats.daily.insert(previous, stats.today_bytes);
    }
    stats.today_bytes = 0;
    stats.today_date = Some(today);
    true
}
