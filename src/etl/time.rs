//! Time-dimension derivation from epoch milliseconds.

use crate::warehouse::TimeRow;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Text format of `start_time` columns. Keeps millisecond precision.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Convert epoch milliseconds to a UTC instant. `None` when out of chrono's range.
pub fn timestamp_from_millis(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ts)
}

pub fn format_start_time(instant: &DateTime<Utc>) -> String {
    instant.format(START_TIME_FORMAT).to_string()
}

impl TimeRow {
    /// Derive the time-dimension row for an event timestamp, always in UTC.
    pub fn from_epoch_millis(ts: i64) -> Option<TimeRow> {
        let instant = timestamp_from_millis(ts)?;
        Some(TimeRow {
            start_time: format_start_time(&instant),
            hour: instant.hour(),
            day: instant.day(),
            week: instant.iso_week().week(),
            month: instant.month(),
            year: instant.year(),
            weekday: instant.weekday().num_days_from_monday(),
        })
    }
}
