//! Crawler module for novel scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry logic
//! - URL construction for the site's hosts
//! - Per-novel orchestration (classification, skip policy, persistence)
//! - The run driver that walks a range of identifiers

mod coordinator;
mod driver;
mod endpoints;
mod fetcher;

pub use coordinator::{should_skip, NovelScraper, ScrapeOutcome};
pub use driver::{run_plan, RunPlan, RunSummary};
pub use endpoints::SiteUrls;
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete scrape
///
/// This is the main entry point for a run. It will:
/// 1. Open the storage layer
/// 2. Build the HTTP client
/// 3. Walk the configured identifiers
/// 4. Scrape metadata, impressions, and content for each novel found
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every identifier was handled
/// * `Err(CrawlError)` - An identifier failed and the run stopped there
pub async fn scrape(config: &Config) -> Result<RunSummary, CrawlError> {
    driver::run(config).await
}
