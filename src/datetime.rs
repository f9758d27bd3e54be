//! Date/time utilities for newswire.
//!
//! Timestamps are stored in SQLite as UTC text in the `YYYY-MM-DD HH:MM:SS`
//! layout produced by `datetime('now')`, so range queries can compare them
//! as plain strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Layout used for every timestamp column.
const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts accepted for feed dates, interpreted as UTC.
const NAIVE_FEED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
];

/// Offset-carrying layouts that RFC 2822/3339 parsing rejects.
const OFFSET_FEED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
];

/// Format a UTC timestamp for storage.
pub fn to_db_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DB_FORMAT).to_string()
}

/// Parse a stored timestamp (SQLite layout or RFC 3339).
pub fn parse_db_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, DB_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp as RFC 3339 with a `Z` suffix (API and sitemap output).
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a feed `pubDate` leniently.
///
/// Accepts RFC 2822 (the RSS norm), RFC 3339, and a handful of layouts
/// seen in the wild. Returns `None` instead of failing.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FEED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Trailing zone names other than the ones RFC 2822 knows are dropped
    // and the remainder read as UTC.
    let without_zone = s
        .strip_suffix(" UTC")
        .or_else(|| s.strip_suffix(" GMT"))
        .or_else(|| s.strip_suffix(" Z"))
        .unwrap_or(s);
    for fmt in NAIVE_FEED_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(without_zone, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
