//! Command-line interface for newswire.
//!
//! `serve` runs the HTTP interface, `crawl` and `sitemap` run a single job
//! and print its output, and `sources` / `regions` manage the catalog
//! configuration the crawler reads.

use std::fmt::Write as _;

use clap::{Parser, Subcommand};

use crate::catalog::{Category, NewSource, Region, RegionRepository, SourceRepository};
use crate::datetime::to_rfc3339;
use crate::db::Database;
use crate::{NewswireError, Result};

/// News aggregator feed ingestion service.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "NEWSWIRE_CONFIG", default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Run one crawl and print the JSON report
    Crawl,
    /// Generate the sitemap and print it
    Sitemap,
    /// Manage feed sources
    #[command(subcommand)]
    Sources(SourceCommand),
    /// Manage region keyword mappings
    #[command(subcommand)]
    Regions(RegionCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SourceCommand {
    /// List all sources
    List,
    /// Add a source
    Add {
        name: String,
        /// Website URL
        url: String,
        /// Feed URL
        rss_url: String,
        /// nederland, internationaal or tech
        #[arg(long, default_value = "nederland")]
        category: String,
        /// Add the source disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Include a source in crawl runs
    Enable { id: String },
    /// Exclude a source from crawl runs
    Disable { id: String },
    /// Delete a source and its articles
    Remove { id: String },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RegionCommand {
    /// List regions in classification order
    List,
    /// Add a region with one or more keywords
    Add {
        name: String,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
}

/// Run a source management command and return the text to print.
pub async fn run_source_command(db: &Database, command: SourceCommand) -> Result<String> {
    let repo = SourceRepository::new(db.pool());
    let mut out = String::new();

    match command {
        SourceCommand::List => {
            for source in repo.list_all().await? {
                let _ = writeln!(
                    out,
                    "{}  {:<24} {:<14} {:<8} {}  last crawled: {}",
                    source.id,
                    source.name,
                    source.category,
                    if source.is_active { "active" } else { "inactive" },
                    source.rss_url,
                    source
                        .last_crawled_at
                        .map(|t| to_rfc3339(&t))
                        .unwrap_or_else(|| "never".to_string()),
                );
            }
        }
        SourceCommand::Add {
            name,
            url,
            rss_url,
            category,
            inactive,
        } => {
            let category: Category = category.parse()?;
            let source = repo
                .create(
                    &NewSource::new(name, url, rss_url)
                        .with_category(category)
                        .with_active(!inactive),
                )
                .await?;
            let _ = writeln!(out, "Added source {} ({})", source.name, source.id);
        }
        SourceCommand::Enable { id } => {
            require(repo.set_active(&id, true).await?, &id)?;
            let _ = writeln!(out, "Enabled source {id}");
        }
        SourceCommand::Disable { id } => {
            require(repo.set_active(&id, false).await?, &id)?;
            let _ = writeln!(out, "Disabled source {id}");
        }
        SourceCommand::Remove { id } => {
            require(repo.delete(&id).await?, &id)?;
            let _ = writeln!(out, "Removed source {id}");
        }
    }

    Ok(out)
}

/// Run a region management command and return the text to print.
pub async fn run_region_command(db: &Database, command: RegionCommand) -> Result<String> {
    let repo = RegionRepository::new(db.pool());
    let mut out = String::new();

    match command {
        RegionCommand::List => {
            for region in repo.list().await? {
                let _ = writeln!(out, "{}: {}", region.name, region.keywords.join(", "));
            }
        }
        RegionCommand::Add { name, keywords } => {
            repo.create(&Region::new(name.as_str(), keywords)).await?;
            let _ = writeln!(out, "Added region {name}");
        }
    }

    Ok(out)
}

fn require(found: bool, id: &str) -> Result<()> {
    if found {
        Ok(())
    } else {
        Err(NewswireError::NotFound(format!("source {id}")))
    }
}
