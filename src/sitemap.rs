//! Sitemap generation for newswire.
//!
//! Builds a sitemaps.org `urlset` covering the static pages and the most
//! recent articles, and caches the result in `site_settings`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::catalog::{Article, ArticleRepository, SettingsRepository};
use crate::datetime::to_rfc3339;
use crate::db::DbPool;
use crate::Result;

/// Settings key the generated document is cached under.
pub const SITEMAP_SETTING_KEY: &str = "sitemap_xml";

/// Maximum number of article URLs in one sitemap.
pub const MAX_SITEMAP_ARTICLES: usize = 5000;

/// Static pages: path, change frequency, priority.
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/", "hourly", "1.0"),
    ("/privacy", "monthly", "0.3"),
    ("/disclaimer", "monthly", "0.3"),
    ("/contact", "monthly", "0.5"),
];

/// Generates and caches the site's sitemap.
pub struct SitemapGenerator<'a> {
    pool: &'a DbPool,
    base_url: &'a str,
}

impl<'a> SitemapGenerator<'a> {
    pub fn new(pool: &'a DbPool, base_url: &'a str) -> Self {
        Self { pool, base_url }
    }

    /// Build the sitemap from the current catalog and cache it.
    pub async fn generate(&self) -> Result<String> {
        let articles = ArticleRepository::new(self.pool)
            .list_recent(MAX_SITEMAP_ARTICLES)
            .await?;

        let xml = render_sitemap(self.base_url, &articles, Utc::now());
        SettingsRepository::new(self.pool)
            .upsert(SITEMAP_SETTING_KEY, &xml)
            .await?;

        info!(
            "Sitemap generated with {} URLs",
            articles.len() + STATIC_PAGES.len()
        );
        Ok(xml)
    }

    /// The last generated sitemap, if any.
    pub async fn cached(&self) -> Result<Option<String>> {
        SettingsRepository::new(self.pool)
            .get(SITEMAP_SETTING_KEY)
            .await
    }
}

/// Render the sitemap document.
pub fn render_sitemap(base_url: &str, articles: &[Article], now: DateTime<Utc>) -> String {
    let base = base_url.trim_end_matches('/');
    let now = to_rfc3339(&now);

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for (path, changefreq, priority) in STATIC_PAGES {
        push_url(&mut xml, &format!("{base}{path}"), &now, changefreq, priority);
    }

    for article in articles {
        let lastmod = to_rfc3339(&article.published_at.unwrap_or(article.created_at));
        push_url(
            &mut xml,
            &format!("{base}/artikel/{}", article.id),
            &lastmod,
            "daily",
            "0.8",
        );
    }

    xml.push_str("</urlset>");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    // Writing to a String cannot fail.
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{lastmod}</lastmod>\n    \
         <changefreq>{changefreq}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n",
        escape_xml(loc)
    );
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
