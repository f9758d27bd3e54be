//! newswire - news aggregator feed ingestion
//!
//! Crawls the RSS feeds of configured news sources, tags each article with
//! the regions it mentions and files it into a shared catalog keyed by the
//! article URL.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod sitemap;
pub mod web;

pub use catalog::{Article, Category, CrawlStatus, NewArticle, NewSource, Region, Source};
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlReport, FeedFetcher, HttpFeedFetcher};
pub use db::Database;
pub use error::{FetchError, NewswireError, Result};
