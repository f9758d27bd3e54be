//! Catalog repositories for newswire.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use super::types::{
    Article, Category, CrawlLog, CrawlLogWithSource, CrawlStats, CrawlStatus, NewArticle,
    NewCrawlLog, NewSource, Region, Source,
};
use crate::datetime::{parse_db_datetime, to_db_datetime};
use crate::db::{DbPool, SQL_TRUE};
use crate::{NewswireError, Result};

/// Row type for a source from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SourceRow {
    id: String,
    name: String,
    url: String,
    rss_url: String,
    category: String,
    is_active: bool,
    last_crawled_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|_| {
            warn!(
                "Source {} has unknown category {:?}, using default",
                row.id, row.category
            );
            Category::default()
        });
        Source {
            id: row.id,
            name: row.name,
            url: row.url,
            rss_url: row.rss_url,
            category,
            is_active: row.is_active,
            last_crawled_at: row.last_crawled_at.and_then(|s| parse_db_datetime(&s)),
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for a region from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct RegionRow {
    name: String,
    keywords: String,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        let keywords = serde_json::from_str(&row.keywords).unwrap_or_else(|e| {
            warn!("Region {} has unreadable keywords: {}", row.name, e);
            Vec::new()
        });
        Region {
            name: row.name,
            keywords,
        }
    }
}

/// Row type for an article from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: String,
    slug: Option<String>,
    source_id: String,
    title: String,
    description: Option<String>,
    content: Option<String>,
    url: String,
    image_url: Option<String>,
    published_at: Option<String>,
    category: String,
    detected_regions: String,
    is_breaking: bool,
    created_at: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            slug: row.slug,
            source_id: row.source_id,
            title: row.title,
            description: row.description,
            content: row.content,
            url: row.url,
            image_url: row.image_url,
            published_at: row.published_at.and_then(|s| parse_db_datetime(&s)),
            category: row.category.parse().unwrap_or_default(),
            detected_regions: serde_json::from_str(&row.detected_regions).unwrap_or_default(),
            is_breaking: row.is_breaking,
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for a crawl log joined with its source name.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CrawlLogRow {
    id: String,
    source_id: Option<String>,
    status: String,
    articles_found: i64,
    articles_added: i64,
    error_message: Option<String>,
    created_at: String,
    source_name: Option<String>,
}

impl From<CrawlLogRow> for CrawlLogWithSource {
    fn from(row: CrawlLogRow) -> Self {
        CrawlLogWithSource {
            log: CrawlLog {
                id: row.id,
                source_id: row.source_id,
                status: CrawlStatus::from_db(&row.status),
                articles_found: row.articles_found,
                articles_added: row.articles_added,
                error_message: row.error_message,
                created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
            },
            source_name: row.source_name,
        }
    }
}

const SOURCE_COLUMNS: &str =
    "id, name, url, rss_url, category, is_active, last_crawled_at, created_at, updated_at";

const ARTICLE_COLUMNS: &str = "id, slug, source_id, title, description, content, url, \
     image_url, published_at, category, detected_regions, is_breaking, created_at";

/// Repository for feed sources.
pub struct SourceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SourceRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new source.
    pub async fn create(&self, source: &NewSource) -> Result<Source> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO sources (id, name, url, rss_url, category, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&id)
        .bind(&source.name)
        .bind(&source.url)
        .bind(&source.rss_url)
        .bind(source.category.as_str())
        .bind(source.is_active)
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| NewswireError::NotFound("source".into()))
    }

    /// Get a source by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Source>> {
        let query = format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE id = $1");
        let row = sqlx::query_as::<_, SourceRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Source::from))
    }

    /// List active sources, ordered by name.
    pub async fn list_active(&self) -> Result<Vec<Source>> {
        let query = format!(
            "SELECT {SOURCE_COLUMNS} FROM sources WHERE is_active = {SQL_TRUE} ORDER BY name ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, SourceRow>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Source::from).collect())
    }

    /// List all sources including inactive ones, ordered by name.
    pub async fn list_all(&self) -> Result<Vec<Source>> {
        let query = format!("SELECT {SOURCE_COLUMNS} FROM sources ORDER BY name ASC, id ASC");
        let rows = sqlx::query_as::<_, SourceRow>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Source::from).collect())
    }

    /// Enable or disable a source.
    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sources SET is_active = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(is_active)
        .bind(to_db_datetime(&Utc::now()))
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp the last crawl time of a source.
    pub async fn touch_last_crawled(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("UPDATE sources SET last_crawled_at = $1 WHERE id = $2")
            .bind(to_db_datetime(&at))
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a source.
    ///
    /// Its articles are removed; its crawl logs remain with a null source.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sources WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for regions.
pub struct RegionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RegionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a region, returning its ID.
    pub async fn create(&self, region: &Region) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let keywords = serde_json::to_string(&region.keywords)
            .map_err(|e| NewswireError::Validation(format!("invalid keywords: {e}")))?;

        sqlx::query("INSERT INTO regions (id, name, keywords) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(&region.name)
            .bind(keywords)
            .execute(self.pool)
            .await?;

        Ok(id)
    }

    /// List all regions in creation order.
    pub async fn list(&self) -> Result<Vec<Region>> {
        let rows = sqlx::query_as::<_, RegionRow>(
            "SELECT name, keywords FROM regions ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Region::from).collect())
    }
}

/// Repository for the article catalog.
pub struct ArticleRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert an article unless one with the same URL exists.
    ///
    /// Returns `true` when a row was inserted. An existing row is left
    /// untouched; concurrent inserts of the same URL are arbitrated by the
    /// unique index and the loser reports `false`.
    pub async fn insert_if_absent(&self, article: &NewArticle) -> Result<bool> {
        let regions = serde_json::to_string(&article.detected_regions)
            .map_err(|e| NewswireError::Validation(format!("invalid regions: {e}")))?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles (id, source_id, title, description, url, image_url,
                                  published_at, category, detected_regions, is_breaking,
                                  created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&article.source_id)
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(article.published_at.as_ref().map(to_db_datetime))
        .bind(article.category.as_str())
        .bind(regions)
        .bind(article.is_breaking)
        .bind(to_db_datetime(&Utc::now()))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get an article by its canonical URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = $1");
        let row = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(url)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Article::from))
    }

    /// Count all articles.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// List articles, newest publication first.
    ///
    /// Articles without a publication date sort by creation time.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let query = format!(
            r#"
            SELECT {ARTICLE_COLUMNS} FROM articles
            ORDER BY COALESCE(published_at, created_at) DESC, rowid DESC
            LIMIT $1
            "#
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(limit as i64)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}

/// Repository for crawl telemetry.
pub struct CrawlLogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CrawlLogRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append a crawl log entry, returning its ID.
    pub async fn append(&self, entry: &NewCrawlLog) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO crawl_logs (id, source_id, status, articles_found, articles_added,
                                    error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&id)
        .bind(&entry.source_id)
        .bind(entry.status.as_str())
        .bind(entry.articles_found)
        .bind(entry.articles_added)
        .bind(&entry.error_message)
        .bind(to_db_datetime(&Utc::now()))
        .execute(self.pool)
        .await?;

        Ok(id)
    }

    /// List the most recent crawl logs with their source names.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<CrawlLogWithSource>> {
        let rows = sqlx::query_as::<_, CrawlLogRow>(
            r#"
            SELECT l.id, l.source_id, l.status, l.articles_found, l.articles_added,
                   l.error_message, l.created_at, s.name AS source_name
            FROM crawl_logs l
            LEFT JOIN sources s ON s.id = l.source_id
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CrawlLogWithSource::from).collect())
    }

    /// Count all crawl log entries.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crawl_logs")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Aggregate crawl results recorded at or after `since`.
    pub async fn stats_since(&self, since: DateTime<Utc>) -> Result<CrawlStats> {
        let (total, successful, failed, found, added): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                       COALESCE(SUM(CASE WHEN status = 'error' THEN 1 ELSE 0 END), 0),
                       COALESCE(SUM(articles_found), 0),
                       COALESCE(SUM(articles_added), 0)
                FROM crawl_logs
                WHERE created_at >= $1
                "#,
            )
            .bind(to_db_datetime(&since))
            .fetch_one(self.pool)
            .await?;

        Ok(CrawlStats {
            total_crawls: total,
            successful_crawls: successful,
            failed_crawls: failed,
            total_articles_found: found,
            total_articles_added: added,
        })
    }
}

/// Repository for cached site artifacts (key/value).
pub struct SettingsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get a value by key.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Insert or replace a value.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(to_db_datetime(&Utc::now()))
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
