use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use newswire::cli::{run_region_command, run_source_command, Cli, Command};
use newswire::sitemap::SitemapGenerator;
use newswire::web::WebServer;
use newswire::{Config, CrawlOrchestrator, Database, HttpFeedFetcher};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    // Load configuration
    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config);
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // The server logs to file as well; one-shot commands keep stdout for
    // their own output.
    if command == Command::Serve {
        if let Err(e) = newswire::logging::init_server(&config.logging) {
            eprintln!("Failed to initialize logging: {e}");
            newswire::logging::init_command(&config.logging.level);
        }
    } else {
        newswire::logging::init_command(&config.logging.level);
    }

    match run(command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> newswire::Result<ExitCode> {
    config.validate()?;
    let db = Database::open(&config.database.path).await?;

    match command {
        Command::Serve => {
            info!("newswire - news aggregator feed ingestion");
            let fetcher = Arc::new(HttpFeedFetcher::new(&config.crawler)?);
            WebServer::new(&config, db, fetcher)?.run().await?;
        }
        Command::Crawl => {
            let fetcher = Arc::new(HttpFeedFetcher::new(&config.crawler)?);
            let report = CrawlOrchestrator::from_config(db, fetcher, &config.crawler)
                .run()
                .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Sitemap => {
            let xml = SitemapGenerator::new(db.pool(), &config.site.base_url)
                .generate()
                .await?;
            println!("{xml}");
        }
        Command::Sources(cmd) => print!("{}", run_source_command(&db, cmd).await?),
        Command::Regions(cmd) => print!("{}", run_region_command(&db, cmd).await?),
    }

    Ok(ExitCode::SUCCESS)
}
