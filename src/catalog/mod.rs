//! Article catalog for newswire.
//!
//! Sources, regions, articles and crawl telemetry as stored in the
//! relational store, plus the repositories that read and write them.

pub mod repository;
pub mod types;

pub use repository::{
    ArticleRepository, CrawlLogRepository, RegionRepository, SettingsRepository, SourceRepository,
};
pub use types::{
    Article, Category, CrawlLog, CrawlLogWithSource, CrawlStats, CrawlStatus, NewArticle,
    NewCrawlLog, NewSource, Region, Source,
};
