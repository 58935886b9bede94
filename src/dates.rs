//! Order date normalization.
//!
//! The orders export mixes Unix timestamps (sometimes with a fractional
//! part) and dates written in many human formats. Timestamps are tried
//! first; anything non-numeric goes through a flexible format matcher.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Datetime layouts tried after weekday names and commas are stripped
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%y-%m-%d %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
];

/// Date layouts, month-first before day-first for ambiguous numeric dates.
/// Two-digit years come before four-digit ones: `%Y` would accept "15".
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%d-%B-%y",
    "%d-%B-%Y",
    "%d %B %y",
    "%d %B %Y",
    "%B %d %y",
    "%B %d %Y",
    "%Y %B %d",
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "mon",
    "tue",
    "tues",
    "wed",
    "thu",
    "thur",
    "thurs",
    "fri",
    "sat",
    "sun",
];

/// Parse a raw order date into a timestamp
///
/// Returns `None` when neither the numeric nor the textual interpretation
/// succeeds; callers turn that into `ForecastError::DateParse`.
pub fn normalize_date(raw: &str) -> Option<NaiveDateTime> {
    parse_unix_timestamp(raw).or_else(|| parse_date_string(raw))
}

/// Interpret the value as seconds since the epoch (UTC), truncating fractions
pub fn parse_unix_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let seconds: f64 = raw.trim().parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|dt| dt.naive_utc())
}

/// Flexible parser for human-written dates
pub fn parse_date_string(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.naive_utc());
    }

    let normalized = strip_weekday(&trimmed.replace(',', " "));

    // `%Y` accepts two digits, so a short year would land in the first century
    let datetime = DATETIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .find(|dt| dt.year() >= 1000);
    if datetime.is_some() {
        return datetime;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .find(|date| date.year() >= 1000)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// ISO-8601 week number (1..=53) of a timestamp
pub fn iso_week(date: &NaiveDateTime) -> u32 {
    date.iso_week().week()
}

/// Collapse whitespace and drop a leading weekday name ("Thursday 01 Jan 2015")
fn strip_weekday(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() > 1 {
        let first = tokens[0].trim_end_matches('.').to_ascii_lowercase();
        if WEEKDAYS.contains(&first.as_str()) {
            tokens.remove(0);
        }
    }
    tokens.join(" ")
}
