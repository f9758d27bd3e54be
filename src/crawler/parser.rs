//! Feed parsers.
//!
//! [`TolerantRssParser`] scans for `<item>` blocks and pulls fields out of
//! each one without building a document tree, so feeds with broken XML
//! still yield whatever items are recognizable. [`StrictFeedParser`] runs
//! the document through feed-rs and supports Atom as well.

use std::sync::Arc;

use crate::config::{CrawlerConfig, ParserKind};
use crate::crawler::text::{clean_text, clean_url, collapse_whitespace, strip_cdata, truncate_chars};
use crate::crawler::types::{ParsedFeed, RawFeedItem, MAX_DESCRIPTION_LENGTH};
use crate::error::{NewswireError, Result};

/// Turns feed text into raw items.
pub trait FeedParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<ParsedFeed>;
}

/// Build the parser selected in the crawler settings.
pub fn parser_for(config: &CrawlerConfig) -> Arc<dyn FeedParser> {
    match config.parser {
        ParserKind::Tolerant => Arc::new(TolerantRssParser::new(config.max_description_length)),
        ParserKind::Strict => Arc::new(StrictFeedParser::new(config.max_description_length)),
    }
}

/// Pattern-based RSS 2.0 parser.
///
/// Never fails: input that contains no `<item>` blocks yields an empty
/// feed. Items without a title or without a link/guid are dropped but
/// still counted in [`ParsedFeed::fragments`].
#[derive(Debug, Clone)]
pub struct TolerantRssParser {
    max_description_length: usize,
}

impl TolerantRssParser {
    pub fn new(max_description_length: usize) -> Self {
        Self {
            max_description_length,
        }
    }
}

impl Default for TolerantRssParser {
    fn default() -> Self {
        Self::new(MAX_DESCRIPTION_LENGTH)
    }
}

impl FeedParser for TolerantRssParser {
    fn parse(&self, text: &str) -> Result<ParsedFeed> {
        let fragments = item_fragments(text);
        let items = fragments
            .iter()
            .filter_map(|fragment| parse_item(fragment, self.max_description_length))
            .collect();

        Ok(ParsedFeed {
            fragments: fragments.len(),
            items,
        })
    }
}

fn parse_item(fragment: &str, max_description_length: usize) -> Option<RawFeedItem> {
    let title = tag_text(fragment, "title")
        .map(clean_text)
        .filter(|s| !s.is_empty())?;

    let link = tag_text(fragment, "link")
        .map(clean_url)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            tag_text(fragment, "guid")
                .map(clean_url)
                .filter(|s| !s.is_empty())
        })?;

    let description = tag_text(fragment, "description")
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(&s, max_description_length));

    let pub_date = tag_text(fragment, "pubDate")
        .or_else(|| tag_text(fragment, "dc:date"))
        .map(|s| collapse_whitespace(&strip_cdata(s)))
        .filter(|s| !s.is_empty());

    let image_url = tag_attribute(fragment, "enclosure", "url")
        .or_else(|| tag_attribute(fragment, "media:content", "url"))
        .or_else(|| tag_attribute(fragment, "media:thumbnail", "url"));

    Some(RawFeedItem {
        title,
        link,
        description,
        pub_date,
        image_url,
    })
}

/// An opening tag located in a document.
struct OpenTag<'a> {
    /// Text between the tag name and the closing `>`.
    attrs: &'a str,
    /// Byte offset just past the `>`.
    content_start: usize,
    self_closing: bool,
}

/// ASCII case-insensitive search for `needle` starting at byte `from`.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || from > hay.len() {
        return None;
    }
    hay[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|p| p + from)
}

fn find_open_tag<'a>(doc: &'a str, name: &str, from: usize) -> Option<OpenTag<'a>> {
    let pattern = format!("<{name}");
    let mut pos = from;

    loop {
        let start = find_ci(doc, &pattern, pos)?;
        let after_name = start + pattern.len();
        match doc.as_bytes().get(after_name) {
            Some(&b) if b == b'>' || b == b'/' || b.is_ascii_whitespace() => {
                let close = doc[after_name..].find('>')? + after_name;
                return Some(OpenTag {
                    attrs: &doc[after_name..close],
                    content_start: close + 1,
                    self_closing: doc[..close].ends_with('/'),
                });
            }
            // `<items>`, `<itemCount>` and similar
            _ => pos = after_name,
        }
    }
}

/// Inner text of every `<item>...</item>` block, in document order.
fn item_fragments(doc: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut pos = 0;

    while let Some(open) = find_open_tag(doc, "item", pos) {
        if open.self_closing {
            pos = open.content_start;
            continue;
        }
        let Some(close) = find_ci(doc, "</item>", open.content_start) else {
            break;
        };
        fragments.push(&doc[open.content_start..close]);
        pos = close + "</item>".len();
    }

    fragments
}

/// Raw inner text of the first `<name>` element, CDATA unwrapped.
fn tag_text<'a>(fragment: &'a str, name: &str) -> Option<&'a str> {
    let closing = format!("</{name}>");
    let mut pos = 0;

    while let Some(open) = find_open_tag(fragment, name, pos) {
        if open.self_closing {
            pos = open.content_start;
            continue;
        }
        let body = &fragment[open.content_start..];

        if let Some(cdata) = body.trim_start().strip_prefix("<![CDATA[") {
            if let Some(end) = cdata.find("]]>") {
                let tail = cdata[end + 3..].trim_start();
                if find_ci(tail, &closing, 0) == Some(0) {
                    return Some(&cdata[..end]);
                }
            }
        }

        let end = find_ci(body, &closing, 0)?;
        return Some(&body[..end]);
    }

    None
}

/// Value of `attr` on the first `<name>` tag that carries it.
fn tag_attribute(fragment: &str, name: &str, attr: &str) -> Option<String> {
    let mut pos = 0;
    while let Some(open) = find_open_tag(fragment, name, pos) {
        if let Some(value) = attribute_value(open.attrs, attr) {
            return Some(value);
        }
        pos = open.content_start;
    }
    None
}

fn attribute_value(attrs: &str, attr: &str) -> Option<String> {
    let pattern = format!("{attr}=");
    let mut pos = 0;

    while let Some(idx) = find_ci(attrs, &pattern, pos) {
        pos = idx + pattern.len();
        let at_boundary = idx == 0 || attrs.as_bytes()[idx - 1].is_ascii_whitespace();
        if !at_boundary {
            continue;
        }

        let after = &attrs[pos..];
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        if let Some(end) = after[1..].find(quote) {
            let value = clean_url(&after[1..1 + end]);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    None
}

/// feed-rs backed parser for well-formed RSS, Atom and JSON Feed.
#[derive(Debug, Clone)]
pub struct StrictFeedParser {
    max_description_length: usize,
}

impl StrictFeedParser {
    pub fn new(max_description_length: usize) -> Self {
        Self {
            max_description_length,
        }
    }
}

impl Default for StrictFeedParser {
    fn default() -> Self {
        Self::new(MAX_DESCRIPTION_LENGTH)
    }
}

impl FeedParser for StrictFeedParser {
    fn parse(&self, text: &str) -> Result<ParsedFeed> {
        let feed = feed_rs::parser::parse(text.as_bytes())
            .map_err(|e| NewswireError::Parse(e.to_string()))?;

        let fragments = feed.entries.len();
        let items = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let title = entry
                    .title
                    .map(|t| clean_text(&t.content))
                    .filter(|s| !s.is_empty())?;
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.trim().to_string())
                    .filter(|s| !s.is_empty())?;
                let description = entry
                    .summary
                    .map(|t| t.content)
                    .or(entry.content.and_then(|c| c.body))
                    .map(|d| clean_text(&d))
                    .filter(|s| !s.is_empty())
                    .map(|d| truncate_chars(&d, self.max_description_length));
                let pub_date = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc3339());
                let image_url = entry.media.iter().find_map(|media| {
                    media
                        .content
                        .iter()
                        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
                        .or_else(|| media.thumbnails.first().map(|t| t.image.uri.clone()))
                });

                Some(RawFeedItem {
                    title,
                    link,
                    description,
                    pub_date,
                    image_url,
                })
            })
            .collect();

        Ok(ParsedFeed { fragments, items })
    }
}
