use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Per-day activity counts for one calendar year. Days without activity are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct ActivityCalendar(BTreeMap<String, u32>);

impl ActivityCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, day: impl Into<String>, count: u32) {
        if count == 0 {
            return;
        }
        *self.0.entry(day.into()).or_default() += count;
    }

    pub fn count(&self, day: &str) -> u32 {
        self.0.get(day).copied().unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|&c| c as u64).sum()
    }

    pub fn active_days(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for a calendar with no recorded activity.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<BTreeMap<String, u32>> for ActivityCalendar {
    fn from(map: BTreeMap<String, u32>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ActivityCalendar> for BTreeMap<String, u32> {
    fn from(calendar: ActivityCalendar) -> Self {
        calendar.0
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for ActivityCalendar {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut calendar = Self::new();
        for (day, count) in iter {
            calendar.add(day, count);
        }
        calendar
    }
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// ISO date of the UTC day a moment falls on.
pub fn day_key(moment: &DateTime<Utc>) -> String {
    moment.format("%Y-%m-%d").to_string()
}

pub fn timestamp_in_year(timestamp_secs: i64, year: i32) -> bool {
    DateTime::from_timestamp(timestamp_secs, 0).map_or(false, |date| date.year() == year)
}
