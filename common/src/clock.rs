use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::schedule::Weekday;

/// Calendar breakdown of an offset-corrected timestamp. Weekday numbering is
/// Monday=0 throughout the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub weekday: Weekday,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

pub fn decompose(timestamp: i64) -> TimeParts {
    let datetime =
        DateTime::from_timestamp(timestamp.max(0), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    TimeParts {
        year: datetime.year(),
        month: datetime.month() as u8,
        day: datetime.day() as u8,
        weekday: Weekday::from_index(datetime.weekday().num_days_from_monday() as usize),
        hour: datetime.hour() as u8,
        minute: datetime.minute() as u8,
        second: datetime.second() as u8,
    }
}

/// Journal line prefix, e.g. `2026/08/03 Mon 18:30:00`.
pub fn format_timestamp(timestamp: i64) -> String {
    let parts = decompose(timestamp);
    format!(
        "{:04}/{:02}/{:02} {} {:02}:{:02}:{:02}",
        parts.year,
        parts.month,
        parts.day,
        parts.weekday.short_name(),
        parts.hour,
        parts.minute,
        parts.second
    )
}
