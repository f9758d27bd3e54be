//! Catalog writer.

use chrono::Utc;
use tracing::{debug, warn};

use crate::catalog::NewArticle;
use crate::crawler::store::CatalogStore;

/// Writes normalized articles for one source.
///
/// Write failures are logged and reported as "not added" so one bad row
/// does not end the source's item loop.
pub struct CatalogWriter<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CatalogWriter<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Insert `article` unless its URL already exists.
    ///
    /// Returns `true` when a new row was created.
    pub async fn write(&self, article: &NewArticle) -> bool {
        match self.store.upsert_article(article).await {
            Ok(true) => true,
            Ok(false) => {
                debug!("Skipping known article: {}", article.url);
                false
            }
            Err(e) => {
                warn!("Failed to store article {}: {}", article.url, e);
                false
            }
        }
    }

    /// Stamp the source as crawled now.
    pub async fn mark_crawled(&self, source_id: &str) {
        if let Err(e) = self
            .store
            .touch_source_last_crawled(source_id, Utc::now())
            .await
        {
            warn!("Failed to update last_crawled_at for {}: {}", source_id, e);
        }
    }
}
