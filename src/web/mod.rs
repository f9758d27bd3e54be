//! HTTP interface for newswire.
//!
//! Exposes the crawl trigger, crawl telemetry for the admin dashboard and
//! the generated sitemap.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
