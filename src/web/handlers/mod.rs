//! API handlers for the HTTP interface.

pub mod crawl;
pub mod sitemap;

pub use crawl::*;
pub use sitemap::*;

use std::sync::Arc;

use crate::config::Config;
use crate::crawler::{CrawlOrchestrator, FeedFetcher};
use crate::Database;

/// Shared application state.
pub struct AppState {
    /// Catalog database.
    pub db: Database,
    /// Crawl pipeline.
    pub orchestrator: CrawlOrchestrator,
    /// Public site base URL for sitemap links.
    pub site_base_url: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, fetcher: Arc<dyn FeedFetcher>, config: &Config) -> Self {
        Self {
            orchestrator: CrawlOrchestrator::from_config(db.clone(), fetcher, &config.crawler),
            db,
            site_base_url: config.site.base_url.clone(),
        }
    }
}
