//! Response DTOs for the HTTP interface.

use serde::Serialize;

use crate::catalog::{CrawlLogWithSource, CrawlStatus};
use crate::datetime::to_rfc3339;

/// Crawl log entry as shown on the admin dashboard.
#[derive(Debug, Serialize)]
pub struct CrawlLogResponse {
    pub id: String,
    /// `null` once the source has been deleted.
    pub source_id: Option<String>,
    /// `null` once the source has been deleted.
    pub source_name: Option<String>,
    pub status: CrawlStatus,
    pub articles_found: i64,
    pub articles_added: i64,
    pub error_message: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<CrawlLogWithSource> for CrawlLogResponse {
    fn from(entry: CrawlLogWithSource) -> Self {
        let log = entry.log;
        Self {
            id: log.id,
            source_id: log.source_id,
            source_name: entry.source_name,
            status: log.status,
            articles_found: log.articles_found,
            articles_added: log.articles_added,
            error_message: log.error_message,
            created_at: to_rfc3339(&log.created_at),
        }
    }
}
