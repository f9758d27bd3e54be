//! Catalog access used by the crawler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog::{
    ArticleRepository, CrawlLogRepository, NewArticle, NewCrawlLog, Region, RegionRepository,
    Source, SourceRepository,
};
use crate::db::Database;
use crate::Result;

/// The slice of the catalog a crawl run reads and writes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Sources taking part in crawl runs.
    async fn list_active_sources(&self) -> Result<Vec<Source>>;

    /// Region keyword mapping, in classification order.
    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// Insert an article unless its URL is already stored.
    ///
    /// Returns `true` only when a new row was written.
    async fn upsert_article(&self, article: &NewArticle) -> Result<bool>;

    /// Record that a source was crawled at `at`.
    async fn touch_source_last_crawled(&self, source_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Append a crawl log entry.
    async fn append_crawl_log(&self, entry: &NewCrawlLog) -> Result<()>;
}

/// [`CatalogStore`] backed by the SQLite catalog.
#[derive(Clone)]
pub struct SqlCatalog {
    db: Database,
}

impl SqlCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for SqlCatalog {
    async fn list_active_sources(&self) -> Result<Vec<Source>> {
        SourceRepository::new(self.db.pool()).list_active().await
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        RegionRepository::new(self.db.pool()).list().await
    }

    async fn upsert_article(&self, article: &NewArticle) -> Result<bool> {
        ArticleRepository::new(self.db.pool())
            .insert_if_absent(article)
            .await
    }

    async fn touch_source_last_crawled(&self, source_id: &str, at: DateTime<Utc>) -> Result<()> {
        SourceRepository::new(self.db.pool())
            .touch_last_crawled(source_id, at)
            .await?;
        Ok(())
    }

    async fn append_crawl_log(&self, entry: &NewCrawlLog) -> Result<()> {
        CrawlLogRepository::new(self.db.pool()).append(entry).await?;
        Ok(())
    }
}
