//! Feed ingestion pipeline for newswire.
//!
//! Fetch, parse, classify, normalize and write, driven per source by
//! [`CrawlOrchestrator`].

pub mod classifier;
pub mod fetcher;
pub mod normalizer;
pub mod orchestrator;
pub mod parser;
pub mod store;
pub mod text;
pub mod types;
pub mod writer;

pub use classifier::RegionClassifier;
pub use fetcher::{FeedFetcher, HttpFeedFetcher};
pub use normalizer::normalize;
pub use orchestrator::{CrawlOptions, CrawlOrchestrator};
pub use parser::{parser_for, FeedParser, StrictFeedParser, TolerantRssParser};
pub use store::{CatalogStore, SqlCatalog};
pub use types::{
    CrawlReport, ParsedFeed, RawFeedItem, SourceReport, MAX_DESCRIPTION_LENGTH,
    MAX_ITEMS_PER_SOURCE,
};
pub use writer::CatalogWriter;
