//! Narou-Crawl main entry point
//!
//! This is the command-line interface for the Narou-Crawl novel scraper.

use anyhow::Context;
use clap::Parser;
use narou_crawl::config::{resolve_config, Config, Overrides};
use narou_crawl::crawler::scrape;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Narou-Crawl: a resumable novel scraper
///
/// Narou-Crawl walks novel identifiers from a start to an end identifier,
/// storing metadata, reader impressions, and chapter text in SQLite.
/// Progress is recorded per novel so interrupted runs can be resumed.
#[derive(Parser, Debug)]
#[command(name = "narou-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A resumable novel scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First identifier to visit (inclusive)
    #[arg(long, value_name = "NID")]
    start_from: Option<String>,

    /// Last identifier to visit (inclusive)
    #[arg(long, value_name = "NID")]
    end_with: Option<String>,

    /// Scrape only this identifier
    #[arg(long, value_name = "NID")]
    nid: Option<String>,

    /// Record age-restricted novels without scraping them
    #[arg(long)]
    skip_r18: bool,

    /// Do not scrape chapter text
    #[arg(long)]
    skip_content: bool,

    /// Do not scrape reader impressions
    #[arg(long)]
    skip_impressions: bool,

    /// Do not rescrape impressions or content already recorded as done
    #[arg(long)]
    skip_scraped: bool,

    /// Delete the database and exit
    #[arg(long, conflicts_with = "stats")]
    reset: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "reset")]
    stats: bool,

    /// Path of the log file
    #[arg(long, value_name = "PATH")]
    log_file: Option<String>,

    /// Path of the SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            start_from: self.start_from.clone(),
            end_with: self.end_with.clone(),
            nid: self.nid.clone(),
            skip_r18: self.skip_r18,
            skip_content: self.skip_content,
            skip_impressions: self.skip_impressions,
            skip_scraped: self.skip_scraped,
            database_path: self.database.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;

    setup_logging(Path::new(&config.output.log_file), cli.verbose, cli.quiet)?;

    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    if cli.reset {
        handle_reset(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_scrape(&config).await
    }
}

/// Sets up the logging/tracing subscriber writing to the log file
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn setup_logging(log_file: &Path, verbose: u8, quiet: bool) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("narou_crawl=info,warn"),
                1 => EnvFilter::new("narou_crawl=debug,info"),
                2 => EnvFilter::new("narou_crawl=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    Ok(())
}

/// Handles the --reset mode: deletes the database file
fn handle_reset(config: &Config) -> anyhow::Result<()> {
    use narou_crawl::storage::reset_storage;

    let path = Path::new(&config.output.database_path);
    if reset_storage(path)? {
        tracing::info!("Deleted database {}", path.display());
    } else {
        tracing::info!("No database at {}, nothing to reset", path.display());
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use narou_crawl::output::{load_statistics, print_statistics};
    use narou_crawl::storage::open_storage;

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config) -> anyhow::Result<()> {
    if config.scrape.skip_r18 {
        tracing::info!("R18 novels will be recorded but not scraped");
    }
    if config.scrape.skip_scraped {
        tracing::info!("Sub-resources already recorded as done will be skipped");
    }

    match scrape(config).await {
        Ok(summary) => {
            tracing::info!("Scrape completed: {} identifiers visited", summary.visited());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
