//! Byte accounting per calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Accumulated transfer statistics.
///
/// `today_bytes` always refers to `today_date`. Past days live in `daily`
/// and are only written by a rollover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Archived totals keyed by calendar date.
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily: BTreeMap<NaiveDate, u64>,

    /// Bytes transferred on `today_date`.
    #[serde(default)]
    pub today_bytes: u64,

    /// The date `today_bytes` applies to. `None` only for fresh or legacy
    /// records that never stamped a date.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub today_date: Option<NaiveDate>,
}

impl Statistics {
    /// Empty statistics stamped with `today`.
    #[must_use]
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            daily: BTreeMap::new(),
            today_bytes: 0,
            today_date: Some(today),
        }
    }

    /// Bytes recorded for `date`, reading the live counter for today.
    #[must_use]
    pub fn bytes_on(&self, date: NaiveDate) -> u64 {
        if self.today_date == Some(date) {
            self.today_bytes
        } else {
            self.daily.get(&date).copied().unwrap_or(0)
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
