//! Test helpers for integration tests.
//!
//! Provides a local HTTP feed server, an in-memory fetcher and helpers for
//! building RSS documents and seeding the catalog.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use axum::http::{StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use newswire::catalog::{NewSource, Region, RegionRepository, Source, SourceRepository};
use newswire::{Database, FeedFetcher, FetchError};

type FeedMap = Arc<RwLock<HashMap<String, (StatusCode, String)>>>;

/// HTTP server on a random local port serving canned feed documents.
///
/// Unknown paths answer 404.
pub struct FeedServer {
    addr: SocketAddr,
    feeds: FeedMap,
}

impl FeedServer {
    /// Bind to 127.0.0.1 on a free port and start serving.
    pub async fn start() -> Self {
        let feeds: FeedMap = Arc::new(RwLock::new(HashMap::new()));
        let state = feeds.clone();

        let app = Router::new().fallback(move |uri: Uri| {
            let feeds = state.clone();
            async move {
                let entry = feeds.read().unwrap().get(uri.path()).cloned();
                let (status, body) =
                    entry.unwrap_or((StatusCode::NOT_FOUND, "not found".to_string()));
                (status, [(CONTENT_TYPE, "application/rss+xml; charset=utf-8")], body)
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind feed server");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, feeds }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Serve `body` with status 200 at `path`.
    pub fn set_feed(&self, path: &str, body: impl Into<String>) {
        self.set_response(path, StatusCode::OK, body);
    }

    /// Serve an arbitrary response at `path`.
    pub fn set_response(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.feeds
            .write()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }
}

/// In-memory fetcher keyed by URL; unknown URLs fail with a 404.
#[derive(Default)]
pub struct StubFetcher {
    responses: RwLock<HashMap<String, Result<String, FetchError>>>,
}

impl StubFetcher {
    pub fn set(&self, url: &str, response: Result<String, FetchError>) {
        self.responses
            .write()
            .unwrap()
            .insert(url.to_string(), response);
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::HttpStatus {
                status: 404,
                status_text: "Not Found".to_string(),
            }))
    }
}

/// A well-formed `<item>` block.
pub fn rss_item(title: &str, link: &str) -> String {
    format!(
        "<item><title>{title}</title><link>{link}</link>\
         <pubDate>Tue, 05 Mar 2024 14:07:09 +0100</pubDate></item>"
    )
}

/// Wrap item blocks in an RSS 2.0 document.
pub fn rss_feed(items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test feed</title>
    <link>https://example.nl</link>
    {}
  </channel>
</rss>"#,
        items.join("\n    ")
    )
}

/// Create an active source pointing at `rss_url`.
pub async fn add_source(db: &Database, name: &str, rss_url: &str) -> Source {
    SourceRepository::new(db.pool())
        .create(&NewSource::new(name, "https://example.nl", rss_url))
        .await
        .expect("Failed to create source")
}

/// Create a region.
pub async fn add_region(db: &Database, name: &str, keywords: &[&str]) {
    RegionRepository::new(db.pool())
        .create(&Region::new(name, keywords.iter().copied()))
        .await
        .expect("Failed to create region");
}
