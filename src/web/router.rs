//! Router configuration for the HTTP interface.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{crawl_stats, list_crawl_logs, run_crawl, sitemap_xml, AppState};
use super::middleware::create_cors_layer;

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let crawl_routes = Router::new()
        .route("/", get(run_crawl).post(run_crawl))
        .route("/logs", get(list_crawl_logs))
        .route("/stats", get(crawl_stats));

    let api_routes = Router::new().nest("/crawl", crawl_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/sitemap.xml", get(sitemap_xml))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
