//! Crawl orchestrator.
//!
//! One run walks every active source through
//! fetch, parse and then classify/normalize/write per item. A failure in
//! any stage is confined to its source and recorded in that source's
//! crawl log entry; every active source is attempted exactly once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::catalog::{CrawlStatus, NewCrawlLog, Source};
use crate::config::CrawlerConfig;
use crate::crawler::classifier::RegionClassifier;
use crate::crawler::fetcher::FeedFetcher;
use crate::crawler::normalizer::normalize;
use crate::crawler::parser::{parser_for, FeedParser};
use crate::crawler::store::{CatalogStore, SqlCatalog};
use crate::crawler::types::{CrawlReport, SourceReport, MAX_ITEMS_PER_SOURCE};
use crate::crawler::writer::CatalogWriter;
use crate::db::Database;
use crate::error::{FetchError, Result};

/// Tunables for a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Items written per source per run.
    pub max_items_per_source: usize,
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
    /// Sources processed at the same time.
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_items_per_source: MAX_ITEMS_PER_SOURCE,
            fetch_timeout: Duration::from_secs(30),
            concurrency: 1,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_items_per_source: config.max_items_per_source,
            fetch_timeout: Duration::from_secs(config.timeout_secs),
            concurrency: config.concurrency,
        }
    }
}

#[derive(Debug, Default)]
struct SourceCounts {
    found: i64,
    added: i64,
}

/// Runs crawl passes over the catalog's active sources.
pub struct CrawlOrchestrator {
    store: Arc<dyn CatalogStore>,
    fetcher: Arc<dyn FeedFetcher>,
    parser: Arc<dyn FeedParser>,
    options: CrawlOptions,
}

impl CrawlOrchestrator {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        fetcher: Arc<dyn FeedFetcher>,
        parser: Arc<dyn FeedParser>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            store,
            fetcher,
            parser,
            options,
        }
    }

    /// Orchestrator over the SQLite catalog with the configured parser.
    pub fn from_config(db: Database, fetcher: Arc<dyn FeedFetcher>, config: &CrawlerConfig) -> Self {
        Self::new(
            Arc::new(SqlCatalog::new(db)),
            fetcher,
            parser_for(config),
            CrawlOptions::from(config),
        )
    }

    /// Execute one crawl run.
    ///
    /// Only a failure to load sources or regions fails the whole run;
    /// per-source failures are reported in the results.
    pub async fn run(&self) -> CrawlReport {
        let started = Instant::now();

        let sources = match self.store.list_active_sources().await {
            Ok(sources) => sources,
            Err(e) => {
                error!("Crawl aborted, cannot list sources: {}", e);
                return CrawlReport::failed(e.to_string());
            }
        };
        let regions = match self.store.list_regions().await {
            Ok(regions) => regions,
            Err(e) => {
                error!("Crawl aborted, cannot list regions: {}", e);
                return CrawlReport::failed(e.to_string());
            }
        };
        let classifier = RegionClassifier::new(&regions);

        info!(
            "Crawl started: {} active source(s), {} region(s)",
            sources.len(),
            regions.len()
        );

        let classifier = &classifier;
        let results: Vec<SourceReport> = stream::iter(sources)
            .map(|source| async move { self.crawl_source(&source, classifier).await })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let failed = results
            .iter()
            .filter(|r| r.status == CrawlStatus::Error)
            .count();
        let added: i64 = results.iter().map(|r| r.articles_added).sum();
        info!(
            "Crawl finished in {:.1}s: {} source(s), {} failed, {} new article(s)",
            started.elapsed().as_secs_f64(),
            results.len(),
            failed,
            added
        );

        CrawlReport::completed(results)
    }

    async fn crawl_source(&self, source: &Source, classifier: &RegionClassifier) -> SourceReport {
        debug!("Crawling {} ({})", source.name, source.rss_url);

        let mut counts = SourceCounts::default();
        let (status, error) = match self.ingest(source, classifier, &mut counts).await {
            Ok(()) => {
                info!(
                    "{}: {} found, {} added",
                    source.name, counts.found, counts.added
                );
                (CrawlStatus::Success, None)
            }
            Err(e) => {
                warn!("{}: crawl failed: {}", source.name, e);
                (CrawlStatus::Error, Some(e.to_string()))
            }
        };

        let entry = NewCrawlLog {
            source_id: Some(source.id.clone()),
            status,
            articles_found: counts.found,
            articles_added: counts.added,
            error_message: error.clone(),
        };
        if let Err(e) = self.store.append_crawl_log(&entry).await {
            error!("Failed to append crawl log for {}: {}", source.name, e);
        }

        SourceReport {
            source: source.name.clone(),
            status,
            articles_found: counts.found,
            articles_added: counts.added,
            error,
        }
    }

    async fn ingest(
        &self,
        source: &Source,
        classifier: &RegionClassifier,
        counts: &mut SourceCounts,
    ) -> Result<()> {
        let body = match timeout(self.options.fetch_timeout, self.fetcher.fetch(&source.rss_url)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Network(format!(
                    "request timed out after {:?}",
                    self.options.fetch_timeout
                ))
                .into())
            }
        };

        let feed = self.parser.parse(&body)?;
        counts.found = feed.fragments as i64;
        if feed.items.len() < feed.fragments {
            debug!(
                "{}: skipped {} item(s) without title or link",
                source.name,
                feed.fragments - feed.items.len()
            );
        }

        let writer = CatalogWriter::new(self.store.as_ref());
        for item in feed.items.iter().take(self.options.max_items_per_source) {
            let regions = classifier.classify_item(item);
            let article = normalize(item, source, regions);
            if writer.write(&article).await {
                counts.added += 1;
            }
        }

        writer.mark_crawled(&source.id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::catalog::{
        ArticleRepository, CrawlLogRepository, NewArticle, NewSource, Region, RegionRepository,
        SourceRepository,
    };
    use crate::crawler::parser::TolerantRssParser;
    use crate::NewswireError;

    /// Serves canned bodies keyed by URL; unknown URLs fail with a 404.
    #[derive(Default)]
    struct StubFetcher {
        responses: HashMap<String, std::result::Result<String, FetchError>>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, response: std::result::Result<String, FetchError>) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::HttpStatus {
                    status: 404,
                    status_text: "Not Found".to_string(),
                }))
        }
    }

    /// Never answers.
    struct HangingFetcher;

    #[async_trait]
    impl FeedFetcher for HangingFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<String, FetchError> {
            futures::future::pending().await
        }
    }

    /// Store whose source listing always fails.
    struct BrokenStore;

    #[async_trait]
    impl CatalogStore for BrokenStore {
        async fn list_active_sources(&self) -> Result<Vec<Source>> {
            Err(NewswireError::Database("connection refused".to_string()))
        }
        async fn list_regions(&self) -> Result<Vec<Region>> {
            Ok(Vec::new())
        }
        async fn upsert_article(&self, _article: &NewArticle) -> Result<bool> {
            unreachable!("no source is attempted")
        }
        async fn touch_source_last_crawled(&self, _id: &str, _at: DateTime<Utc>) -> Result<()> {
            unreachable!("no source is attempted")
        }
        async fn append_crawl_log(&self, _entry: &NewCrawlLog) -> Result<()> {
            unreachable!("no source is attempted")
        }
    }

    fn item(title: &str, link: &str) -> String {
        format!("<item><title>{title}</title><link>{link}</link></item>")
    }

    fn feed(items: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>T</title>{}</channel></rss>",
            items.concat()
        )
    }

    fn orchestrator(db: &Database, fetcher: Arc<dyn FeedFetcher>) -> CrawlOrchestrator {
        CrawlOrchestrator::new(
            Arc::new(SqlCatalog::new(db.clone())),
            fetcher,
            Arc::new(TolerantRssParser::default()),
            CrawlOptions::default(),
        )
    }

    async fn add_source(db: &Database, name: &str, rss_url: &str) -> Source {
        SourceRepository::new(db.pool())
            .create(&NewSource::new(name, "https://example.nl", rss_url))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_single_source() {
        let db = Database::open_in_memory().await.unwrap();
        let source = add_source(&db, "NOS", "https://x/feed").await;
        RegionRepository::new(db.pool())
            .create(&Region::new("Amsterdam", ["amsterdam", "a'dam"]))
            .await
            .unwrap();

        let body = feed(&[
            item("Nieuws uit A'dam vandaag", "https://x/artikel/1"),
            "<item><title>Zonder link</title></item>".to_string(),
        ]);
        let fetcher = Arc::new(StubFetcher::default().with("https://x/feed", Ok(body)));

        let report = orchestrator(&db, fetcher).run().await;

        assert!(report.success);
        assert_eq!(
            report.results(),
            &[SourceReport {
                source: "NOS".to_string(),
                status: CrawlStatus::Success,
                articles_found: 2,
                articles_added: 1,
                error: None,
            }]
        );

        let article = ArticleRepository::new(db.pool())
            .get_by_url("https://x/artikel/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(article.source_id, source.id);
        assert_eq!(article.detected_regions, vec!["Amsterdam".to_string()]);

        let logs = CrawlLogRepository::new(db.pool()).list_recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].log.status, CrawlStatus::Success);
        assert_eq!(logs[0].log.articles_found, 2);
        assert_eq!(logs[0].log.articles_added, 1);
        assert_eq!(logs[0].log.error_message, None);

        let reloaded = SourceRepository::new(db.pool())
            .get_by_id(&source.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.last_crawled_at.is_some());
    }

    #[tokio::test]
    async fn test_second_run_adds_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        add_source(&db, "NOS", "https://x/feed").await;
        let body = feed(&[item("A", "https://x/a"), item("B", "https://x/b")]);
        let fetcher = Arc::new(StubFetcher::default().with("https://x/feed", Ok(body)));
        let orchestrator = orchestrator(&db, fetcher);

        let first = orchestrator.run().await;
        let second = orchestrator.run().await;

        assert_eq!(first.results()[0].articles_added, 2);
        assert_eq!(second.results()[0].articles_found, 2);
        assert_eq!(second.results()[0].articles_added, 0);
        assert_eq!(
            ArticleRepository::new(db.pool()).count().await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let db = Database::open_in_memory().await.unwrap();
        let failing = add_source(&db, "A", "https://a/feed").await;
        add_source(&db, "B", "https://b/feed").await;
        add_source(&db, "C", "https://c/feed").await;

        let fetcher = Arc::new(
            StubFetcher::default()
                .with(
                    "https://a/feed",
                    Err(FetchError::HttpStatus {
                        status: 500,
                        status_text: "Internal Server Error".to_string(),
                    }),
                )
                .with("https://b/feed", Ok(feed(&[item("B1", "https://b/1")])))
                .with("https://c/feed", Ok(feed(&[item("C1", "https://c/1")]))),
        );

        let report = orchestrator(&db, fetcher.clone()).run().await;

        assert!(report.success);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        let results = report.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source, "A");
        assert_eq!(results[0].status, CrawlStatus::Error);
        assert_eq!(
            results[0].error.as_deref(),
            Some("HTTP 500: Internal Server Error")
        );
        assert_eq!(results[0].articles_found, 0);
        assert_eq!(results[1].status, CrawlStatus::Success);
        assert_eq!(results[2].articles_added, 1);

        // A failed fetch leaves last_crawled_at untouched.
        let reloaded = SourceRepository::new(db.pool())
            .get_by_id(&failing.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.last_crawled_at.is_none());
    }

    #[tokio::test]
    async fn test_one_log_per_source() {
        let db = Database::open_in_memory().await.unwrap();
        for (name, url) in [("A", "https://a/feed"), ("B", "https://b/feed"), ("C", "https://c/feed")] {
            add_source(&db, name, url).await;
        }
        // Only B answers; A and C get 404s from the stub.
        let fetcher = Arc::new(
            StubFetcher::default().with("https://b/feed", Ok(feed(&[item("B1", "https://b/1")]))),
        );

        orchestrator(&db, fetcher).run().await;

        let logs = CrawlLogRepository::new(db.pool()).list_recent(10).await.unwrap();
        assert_eq!(logs.len(), 3);
        let failures = logs
            .iter()
            .filter(|l| l.log.status == CrawlStatus::Error)
            .count();
        assert_eq!(failures, 2);
        assert!(logs
            .iter()
            .filter(|l| l.log.status == CrawlStatus::Error)
            .all(|l| l.log.error_message.as_deref() == Some("HTTP 404: Not Found")));
    }

    #[tokio::test]
    async fn test_item_cap() {
        let db = Database::open_in_memory().await.unwrap();
        add_source(&db, "Big", "https://big/feed").await;
        let items: Vec<String> = (0..35)
            .map(|i| item(&format!("Item {i}"), &format!("https://big/{i}")))
            .collect();
        let fetcher = Arc::new(StubFetcher::default().with("https://big/feed", Ok(feed(&items))));

        let report = orchestrator(&db, fetcher).run().await;

        assert_eq!(report.results()[0].articles_found, 35);
        assert_eq!(report.results()[0].articles_added, 20);
        assert_eq!(ArticleRepository::new(db.pool()).count().await.unwrap(), 20);
        // The first items in document order are the ones kept.
        assert!(ArticleRepository::new(db.pool())
            .get_by_url("https://big/0")
            .await
            .unwrap()
            .is_some());
        assert!(ArticleRepository::new(db.pool())
            .get_by_url("https://big/20")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_inactive_sources_skipped() {
        let db = Database::open_in_memory().await.unwrap();
        SourceRepository::new(db.pool())
            .create(&NewSource::new("Off", "https://off.nl", "https://off/feed").with_active(false))
            .await
            .unwrap();
        let fetcher = Arc::new(StubFetcher::default());

        let report = orchestrator(&db, fetcher.clone()).run().await;

        assert!(report.success);
        assert!(report.results().is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_fails_run() {
        let report = CrawlOrchestrator::new(
            Arc::new(BrokenStore),
            Arc::new(StubFetcher::default()),
            Arc::new(TolerantRssParser::default()),
            CrawlOptions::default(),
        )
        .run()
        .await;

        assert!(!report.success);
        assert_eq!(
            report.error.as_deref(),
            Some("database error: connection refused")
        );
        assert!(report.results.is_none());
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let db = Database::open_in_memory().await.unwrap();
        add_source(&db, "Slow", "https://slow/feed").await;

        let options = CrawlOptions {
            fetch_timeout: Duration::from_millis(100),
            ..CrawlOptions::default()
        };
        let orchestrator = CrawlOrchestrator::new(
            Arc::new(SqlCatalog::new(db.clone())),
            Arc::new(HangingFetcher),
            Arc::new(TolerantRssParser::default()),
            options,
        );

        let report = orchestrator.run().await;

        let result = &report.results()[0];
        assert_eq!(result.status, CrawlStatus::Error);
        assert_eq!(
            result.error.as_deref(),
            Some("network error: request timed out after 100ms")
        );
    }

    #[tokio::test]
    async fn test_concurrent_run_preserves_source_order() {
        let db = Database::open_in_memory().await.unwrap();
        let mut fetcher = StubFetcher::default();
        for name in ["A", "B", "C", "D"] {
            let url = format!("https://{name}/feed");
            add_source(&db, name, &url).await;
            fetcher = fetcher.with(&url, Ok(feed(&[item(name, &format!("https://{name}/1"))])));
        }

        let options = CrawlOptions {
            concurrency: 3,
            ..CrawlOptions::default()
        };
        let orchestrator = CrawlOrchestrator::new(
            Arc::new(SqlCatalog::new(db.clone())),
            Arc::new(fetcher),
            Arc::new(TolerantRssParser::default()),
            options,
        );

        let report = orchestrator.run().await;
        let names: Vec<&str> = report.results().iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(ArticleRepository::new(db.pool()).count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_run_on_spawned_task() {
        let db = Database::open_in_memory().await.unwrap();
        add_source(&db, "NOS", "https://x/feed").await;
        let fetcher = StubFetcher::default().with(
            "https://x/feed",
            Ok(feed(&[item("Een", "https://x/1")])),
        );
        let orchestrator = Arc::new(orchestrator(&db, Arc::new(fetcher)));

        // Request handlers run the crawl on a multi-threaded runtime.
        let task = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.run().await })
        };
        let report = task.await.unwrap();
        assert!(report.success);
        assert_eq!(report.results()[0].articles_added, 1);
    }

    #[tokio::test]
    async fn test_parse_failure_recorded() {
        let db = Database::open_in_memory().await.unwrap();
        add_source(&db, "Atomless", "https://x/feed").await;
        let fetcher = Arc::new(StubFetcher::default().with("https://x/feed", Ok("<<<".to_string())));

        let orchestrator = CrawlOrchestrator::new(
            Arc::new(SqlCatalog::new(db.clone())),
            fetcher,
            Arc::new(crate::crawler::parser::StrictFeedParser::default()),
            CrawlOptions::default(),
        );
        let report = orchestrator.run().await;

        let result = &report.results()[0];
        assert_eq!(result.status, CrawlStatus::Error);
        assert!(result.error.as_deref().unwrap().starts_with("feed parse error:"));
    }
}
