//! Request DTOs for the HTTP interface.

use serde::Deserialize;

/// Default number of crawl log entries returned.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Maximum number of crawl log entries returned.
pub const MAX_LOG_LIMIT: usize = 500;

/// Default stats window in hours.
pub const DEFAULT_STATS_HOURS: i64 = 24;

/// Maximum stats window in hours (one year).
pub const MAX_STATS_HOURS: i64 = 24 * 365;

/// Query for the crawl log listing.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    /// Number of entries (default 50, capped at 500).
    pub limit: Option<usize>,
}

impl LogsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
    }
}

/// Query for crawl statistics.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Window size in hours (default 24).
    pub hours: Option<i64>,
}

impl StatsQuery {
    /// Window size, or `None` when out of range.
    pub fn hours(&self) -> Option<i64> {
        let hours = self.hours.unwrap_or(DEFAULT_STATS_HOURS);
        (1..=MAX_STATS_HOURS).contains(&hours).then_some(hours)
    }
}
