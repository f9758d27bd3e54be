//! Web API Crawl Tests
//!
//! Integration tests for the crawl trigger, crawl telemetry, sitemap and
//! health endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{add_source, rss_feed, rss_item, StubFetcher};
use newswire::web::handlers::AppState;
use newswire::web::router::create_router;
use newswire::{Config, Database, FetchError};
use serde_json::{json, Value};

/// Create a test server with an in-memory database and stub fetcher.
async fn create_test_server() -> (TestServer, Database, Arc<StubFetcher>) {
    let config = Config::default();
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let fetcher = Arc::new(StubFetcher::default());

    let app_state = Arc::new(AppState::new(db.clone(), fetcher.clone(), &config));
    let router = create_router(app_state, &config.server.cors_origins);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db, fetcher)
}

#[tokio::test]
async fn test_health() {
    let (server, _db, _fetcher) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_crawl_with_no_sources() {
    let (server, _db, _fetcher) = create_test_server().await;

    let response = server.post("/api/crawl").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "results": [] })
    );
}

#[tokio::test]
async fn test_crawl_reports_per_source_results() {
    let (server, db, fetcher) = create_test_server().await;
    add_source(&db, "NOS", "https://x/feed").await;
    add_source(&db, "Omroep", "https://y/feed").await;
    fetcher.set(
        "https://x/feed",
        Ok(rss_feed(&[
            rss_item("Een", "https://x/1"),
            "<item><title>Zonder link</title></item>".to_string(),
        ])),
    );
    fetcher.set(
        "https://y/feed",
        Err(FetchError::HttpStatus {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        }),
    );

    let response = server.post("/api/crawl").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "success": true,
            "results": [
                {
                    "source": "NOS",
                    "status": "success",
                    "articlesFound": 2,
                    "articlesAdded": 1,
                    "error": null
                },
                {
                    "source": "Omroep",
                    "status": "error",
                    "articlesFound": 0,
                    "articlesAdded": 0,
                    "error": "HTTP 503: Service Unavailable"
                }
            ]
        })
    );

    // GET triggers a run as well; nothing new this time.
    let again = server.get("/api/crawl").await.json::<Value>();
    assert_eq!(again["results"][0]["articlesAdded"], 0);
}

#[tokio::test]
async fn test_crawl_wholesale_failure_returns_500() {
    let (server, db, _fetcher) = create_test_server().await;
    db.pool().close().await;

    let response = server.post("/api/crawl").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("database error"));
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn test_crawl_logs_listing() {
    let (server, db, fetcher) = create_test_server().await;
    add_source(&db, "NOS", "https://x/feed").await;
    fetcher.set("https://x/feed", Ok(rss_feed(&[rss_item("Een", "https://x/1")])));

    server.post("/api/crawl").await.assert_status_ok();
    server.post("/api/crawl").await.assert_status_ok();

    let response = server.get("/api/crawl/logs").await;
    response.assert_status_ok();
    let logs = response.json::<Value>();
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["source_name"], "NOS");
    assert_eq!(logs[0]["status"], "success");
    assert!(logs[0]["created_at"].as_str().unwrap().ends_with('Z'));

    let limited = server
        .get("/api/crawl/logs")
        .add_query_param("limit", 1)
        .await
        .json::<Value>();
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_crawl_stats() {
    let (server, db, fetcher) = create_test_server().await;
    add_source(&db, "A", "https://a/feed").await;
    add_source(&db, "B", "https://b/feed").await;
    fetcher.set(
        "https://a/feed",
        Ok(rss_feed(&[
            rss_item("Een", "https://a/1"),
            rss_item("Twee", "https://a/2"),
        ])),
    );

    server.post("/api/crawl").await.assert_status_ok();

    let response = server.get("/api/crawl/stats").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "totalCrawls": 2,
            "successfulCrawls": 1,
            "failedCrawls": 1,
            "totalArticlesFound": 2,
            "totalArticlesAdded": 2
        })
    );

    let bad = server
        .get("/api/crawl/stats")
        .add_query_param("hours", 0)
        .await;
    bad.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_sitemap() {
    let (server, db, fetcher) = create_test_server().await;
    add_source(&db, "NOS", "https://x/feed").await;
    fetcher.set("https://x/feed", Ok(rss_feed(&[rss_item("Een", "https://x/1")])));
    server.post("/api/crawl").await.assert_status_ok();

    let response = server.get("/sitemap.xml").await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/xml");
    assert_eq!(response.header("cache-control"), "public, max-age=600");

    let xml = response.text();
    assert!(xml.contains("<loc>https://giganieuws.nl/</loc>"));
    assert_eq!(xml.matches("<loc>https://giganieuws.nl/artikel/").count(), 1);
    assert_eq!(xml.matches("<url>").count(), 5);
}

#[tokio::test]
async fn test_sitemap_served_from_cache_when_catalog_unreadable() {
    let (server, db, fetcher) = create_test_server().await;
    add_source(&db, "NOS", "https://x/feed").await;
    fetcher.set("https://x/feed", Ok(rss_feed(&[rss_item("Een", "https://x/1")])));
    server.post("/api/crawl").await.assert_status_ok();

    let fresh = server.get("/sitemap.xml").await.text();

    sqlx::query("DROP TABLE articles")
        .execute(db.pool())
        .await
        .unwrap();

    let response = server.get("/sitemap.xml").await;
    response.assert_status_ok();
    assert_eq!(response.text(), fresh);
}

#[tokio::test]
async fn test_sitemap_error_without_cache() {
    let (server, db, _fetcher) = create_test_server().await;
    sqlx::query("DROP TABLE articles")
        .execute(db.pool())
        .await
        .unwrap();

    let response = server.get("/sitemap.xml").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], false);
}
