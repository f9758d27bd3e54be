//! Catalog types for newswire.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NewswireError;

/// Topic category of a source, inherited by its articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Domestic news.
    #[default]
    Nederland,
    /// International news.
    Internationaal,
    /// Technology news.
    Tech,
}

impl Category {
    /// Database/API representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Nederland => "nederland",
            Category::Internationaal => "internationaal",
            Category::Tech => "tech",
        }
    }
}

impl FromStr for Category {
    type Err = NewswireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nederland" => Ok(Category::Nederland),
            "internationaal" => Ok(Category::Internationaal),
            "tech" => Ok(Category::Tech),
            other => Err(NewswireError::Validation(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A configured feed origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Source ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Website URL.
    pub url: String,
    /// Feed URL.
    pub rss_url: String,
    /// Category assigned to every article from this source.
    pub category: Category,
    /// Whether the source takes part in crawl runs.
    pub is_active: bool,
    /// Last crawl attempt that got past fetch and parse.
    pub last_crawled_at: Option<DateTime<Utc>>,
    /// When the source was created.
    pub created_at: DateTime<Utc>,
    /// When the source was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new source.
#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub rss_url: String,
    pub category: Category,
    pub is_active: bool,
}

impl NewSource {
    /// Create a new active source in the default category.
    pub fn new(name: impl Into<String>, url: impl Into<String>, rss_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            rss_url: rss_url.into(),
            category: Category::default(),
            is_active: true,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set whether the source is active.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A named geographic area with its matching keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region name (what gets stored on articles).
    pub name: String,
    /// Case-insensitive substrings that indicate this region.
    pub keywords: Vec<String>,
}

impl Region {
    /// Create a region from a name and keyword list.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// A persisted article.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub slug: Option<String>,
    pub source_id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Canonical URL; unique across the catalog.
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Category,
    pub detected_regions: Vec<String>,
    pub is_breaking: bool,
    pub created_at: DateTime<Utc>,
}

/// Article payload produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub source_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Category,
    pub detected_regions: Vec<String>,
    pub is_breaking: bool,
}

/// Outcome of one source's crawl attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Error,
}

impl CrawlStatus {
    /// Database/API representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlStatus::Success => "success",
            CrawlStatus::Error => "error",
        }
    }

    /// Parse the stored representation; anything unknown counts as an error.
    pub fn from_db(s: &str) -> Self {
        if s == "success" {
            CrawlStatus::Success
        } else {
            CrawlStatus::Error
        }
    }
}

/// An append-only record of one source's crawl attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlLog {
    pub id: String,
    /// Cleared when the source is deleted.
    pub source_id: Option<String>,
    pub status: CrawlStatus,
    pub articles_found: i64,
    pub articles_added: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for appending a crawl log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrawlLog {
    pub source_id: Option<String>,
    pub status: CrawlStatus,
    pub articles_found: i64,
    pub articles_added: i64,
    pub error_message: Option<String>,
}

/// Crawl log joined with its source name, for the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlLogWithSource {
    pub log: CrawlLog,
    /// `None` when the source has since been deleted.
    pub source_name: Option<String>,
}

/// Aggregated crawl telemetry over a time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    pub total_crawls: i64,
    pub successful_crawls: i64,
    pub failed_crawls: i64,
    pub total_articles_found: i64,
    pub total_articles_added: i64,
}
