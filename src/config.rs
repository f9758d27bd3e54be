//! Configuration module for newswire.

use serde::Deserialize;
use std::path::Path;

use crate::{NewswireError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = allow any).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/newswire.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which feed parser the crawler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Pattern-based scanner that survives malformed XML.
    #[default]
    Tolerant,
    /// Full RSS/Atom parser; rejects documents it cannot parse.
    Strict,
}

/// Crawler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total per-fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed body size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Items written per source per run.
    #[serde(default = "default_max_items")]
    pub max_items_per_source: usize,
    /// Description length ceiling in characters.
    #[serde(default = "default_max_description")]
    pub max_description_length: usize,
    /// Number of sources crawled at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Feed parser implementation.
    #[serde(default)]
    pub parser: ParserKind,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; NewsAggregator/1.0)".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_items() -> usize {
    20
}

fn default_max_description() -> usize {
    500
}

fn default_concurrency() -> usize {
    1
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            max_items_per_source: default_max_items(),
            max_description_length: default_max_description(),
            concurrency: default_concurrency(),
            parser: ParserKind::default(),
        }
    }
}

/// Public site configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the public site, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://giganieuws.nl".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/newswire.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Crawler settings.
    #[serde(default)]
    pub crawler: CrawlerConfig,
    /// Public site settings.
    #[serde(default)]
    pub site: SiteConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NewswireError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NewswireError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEWSWIRE_DATABASE_PATH`: Override the database file path
    /// - `NEWSWIRE_PORT`: Override the HTTP port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("NEWSWIRE_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(port) = std::env::var("NEWSWIRE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid NEWSWIRE_PORT value: {}", port),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Rejects values that would make the crawler hang or do nothing.
    pub fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;
        if crawler.user_agent.trim().is_empty() {
            return Err(NewswireError::Config(
                "crawler.user_agent must not be empty".to_string(),
            ));
        }
        if crawler.timeout_secs == 0 || crawler.connect_timeout_secs == 0 {
            return Err(NewswireError::Config(
                "crawler timeouts must be greater than zero".to_string(),
            ));
        }
        if crawler.concurrency == 0 {
            return Err(NewswireError::Config(
                "crawler.concurrency must be at least 1".to_string(),
            ));
        }
        if crawler.max_items_per_source == 0 {
            return Err(NewswireError::Config(
                "crawler.max_items_per_source must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
