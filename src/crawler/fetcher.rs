//! Feed fetcher.
//!
//! Retrieves raw feed documents over HTTP with a fixed User-Agent,
//! bounded timeouts, a redirect limit and a body size ceiling.

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::CrawlerConfig;
use crate::error::{FetchError, NewswireError, Result};

/// Bytes inspected when looking for an XML encoding declaration.
const XML_DECLARATION_SCAN: usize = 256;

/// Retrieves the raw text of a feed document.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the document at `url`.
    ///
    /// Non-2xx responses fail with [`FetchError::HttpStatus`]; connection
    /// and read failures with [`FetchError::Network`].
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// HTTP implementation of [`FeedFetcher`].
pub struct HttpFeedFetcher {
    client: Client,
    max_size: u64,
}

impl HttpFeedFetcher {
    /// Build a fetcher from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NewswireError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_size: config.max_feed_size_bytes,
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(FetchError::TooLarge {
                    size: content_length,
                    max: self.max_size,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if bytes.len() as u64 > self.max_size {
            return Err(FetchError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_size,
            });
        }

        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

/// Reject URLs that are malformed or not http(s).
pub fn validate_url(url: &str) -> std::result::Result<(), FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {scheme}"
            )))
        }
    }

    if parsed.host().is_none() {
        return Err(FetchError::InvalidUrl(format!("{url}: missing host")));
    }

    Ok(())
}

/// Decode a feed body to text.
///
/// The charset comes from the `Content-Type` header, then from the XML
/// declaration, and falls back to UTF-8. A byte order mark overrides both.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_xml_declaration(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

fn charset_from_xml_declaration(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(XML_DECLARATION_SCAN)];
    let head = String::from_utf8_lossy(head);
    let decl_start = head.find("<?xml")?;
    let decl_end = head[decl_start..].find("?>")? + decl_start;
    let decl = &head[decl_start..decl_end];

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}
