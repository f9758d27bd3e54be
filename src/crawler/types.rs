//! Crawler types for newswire.

use serde::{Deserialize, Serialize};

use crate::catalog::CrawlStatus;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum number of items written per source per run.
pub const MAX_ITEMS_PER_SOURCE: usize = 20;

/// One entry extracted from a feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    /// Plain-text title.
    pub title: String,
    /// Article link (or guid when the item has no link).
    pub link: String,
    /// Plain-text description, truncated.
    pub description: Option<String>,
    /// Publish date exactly as the feed wrote it.
    pub pub_date: Option<String>,
    /// Enclosure or media image URL.
    pub image_url: Option<String>,
}

/// Result of parsing one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Number of item blocks found, including ones dropped as malformed.
    pub fragments: usize,
    /// Well-formed items in document order.
    pub items: Vec<RawFeedItem>,
}

/// Per-source entry of a crawl run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    /// Source display name.
    pub source: String,
    pub status: CrawlStatus,
    pub articles_found: i64,
    pub articles_added: i64,
    /// Error message, `null` on success.
    pub error: Option<String>,
}

/// Summary returned by a crawl run.
///
/// Serializes as `{ success: true, results: [...] }` or, when the run
/// could not start, `{ success: false, error: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SourceReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlReport {
    /// A run that attempted every active source.
    pub fn completed(results: Vec<SourceReport>) -> Self {
        Self {
            success: true,
            results: Some(results),
            error: None,
        }
    }

    /// A run that failed before attempting any source.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            error: Some(error.into()),
        }
    }

    /// Per-source results (empty for a failed run).
    pub fn results(&self) -> &[SourceReport] {
        self.results.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_report_shape() {
        let report = CrawlReport::completed(vec![SourceReport {
            source: "NOS".to_string(),
            status: CrawlStatus::Success,
            articles_found: 2,
            articles_added: 1,
            error: None,
        }]);

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "success": true,
                "results": [{
                    "source": "NOS",
                    "status": "success",
                    "articlesFound": 2,
                    "articlesAdded": 1,
                    "error": null
                }]
            })
        );
    }

    #[test]
    fn test_failed_report_shape() {
        let report = CrawlReport::failed("database error: gone");
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "success": false, "error": "database error: gone" })
        );
        assert!(report.results().is_empty());
    }
}
