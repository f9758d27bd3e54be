//! Database schema and migrations for newswire.
//!
//! Migrations are applied in order; the schema_version table records
//! how many have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Feed sources, regions and the article catalog
    r#"
CREATE TABLE sources (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    url             TEXT NOT NULL,
    rss_url         TEXT NOT NULL,
    category        TEXT NOT NULL DEFAULT 'nederland',  -- 'nederland', 'internationaal', 'tech'
    is_active       INTEGER NOT NULL DEFAULT 1,
    last_crawled_at TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sources_is_active ON sources(is_active);

CREATE TABLE regions (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    keywords    TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE articles (
    id               TEXT PRIMARY KEY,
    slug             TEXT,
    source_id        TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    title            TEXT NOT NULL,
    description      TEXT,
    content          TEXT,
    url              TEXT NOT NULL UNIQUE,   -- canonical URL, dedup key
    image_url        TEXT,
    published_at     TEXT,
    category         TEXT NOT NULL,
    detected_regions TEXT NOT NULL DEFAULT '[]',  -- JSON array of region names
    is_breaking      INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_articles_source_id ON articles(source_id);
CREATE INDEX idx_articles_published_at ON articles(published_at);
"#,
    // v2: Crawl telemetry and cached site artifacts
    r#"
CREATE TABLE crawl_logs (
    id              TEXT PRIMARY KEY,
    source_id       TEXT REFERENCES sources(id) ON DELETE SET NULL,
    status          TEXT NOT NULL CHECK (status IN ('success', 'error')),
    articles_found  INTEGER NOT NULL DEFAULT 0,
    articles_added  INTEGER NOT NULL DEFAULT 0,
    error_message   TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_crawl_logs_created_at ON crawl_logs(created_at);

CREATE TABLE site_settings (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
