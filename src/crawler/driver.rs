//! Run driver: walks the configured identifiers and scrapes each one

use crate::config::{Config, ScrapeConfig};
use crate::crawler::coordinator::{NovelScraper, ScrapeOutcome};
use crate::nid::Nid;
use crate::storage::SqliteStorage;
use crate::CrawlError;
use std::path::Path;
use std::time::Instant;

/// Identifiers a run will visit, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub start: Nid,
    pub end: Nid,
    pub reverse: bool,
}

impl RunPlan {
    /// Builds the plan from the scrape settings
    ///
    /// A single target identifier wins over the range. A range walks backwards
    /// when `start` orders after `end`.
    pub fn from_config(options: &ScrapeConfig) -> Result<Self, CrawlError> {
        if let Some(nid) = &options.nid {
            let nid = Nid::parse(nid)?;
            return Ok(Self {
                start: nid,
                end: nid,
                reverse: false,
            });
        }

        let start = Nid::parse(&options.start_from)?;
        let end = Nid::parse(&options.end_with)?;

        Ok(Self {
            start,
            end,
            reverse: start > end,
        })
    }

    /// Every identifier from `start` up to and including `end`
    ///
    /// The end check happens after an identifier is yielded, so `start == end`
    /// yields exactly one identifier.
    pub fn targets(&self) -> impl Iterator<Item = Nid> {
        let end = self.end;
        let mut reached_end = false;

        self.start.sequence(self.reverse).take_while(move |nid| {
            if reached_end {
                return false;
            }
            reached_end = *nid == end;
            true
        })
    }
}

/// Totals of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: usize,
    pub not_found: usize,
    pub skipped_r18: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ScrapeOutcome) {
        match outcome {
            ScrapeOutcome::NotFound => self.not_found += 1,
            ScrapeOutcome::SkippedR18 => self.skipped_r18 += 1,
            ScrapeOutcome::Scraped { .. } => self.scraped += 1,
        }
    }

    pub fn visited(&self) -> usize {
        self.scraped + self.not_found + self.skipped_r18
    }
}

/// Scrapes every identifier of the plan with an existing scraper
///
/// The first failing identifier stops the run and its error is returned.
pub async fn run_plan(
    scraper: &mut NovelScraper<'_>,
    plan: &RunPlan,
) -> Result<RunSummary, CrawlError> {
    let mut summary = RunSummary::default();

    for nid in plan.targets() {
        let started = Instant::now();
        tracing::info!("Start scraping {}", nid);

        match scraper.scrape(&nid).await {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                tracing::error!("Failed {}: {}", nid, e);
                return Err(e);
            }
        }

        tracing::info!(
            "Scraped {} {:.2}s elapsed",
            nid,
            started.elapsed().as_secs_f64()
        );
    }

    Ok(summary)
}

/// Runs a complete scrape with the given configuration
///
/// Opens the database at the configured path, then scrapes the configured
/// identifier or range.
pub async fn run(config: &Config) -> Result<RunSummary, CrawlError> {
    let plan = RunPlan::from_config(&config.scrape)?;

    tracing::info!(
        "Starting scraping from {} to {}{}",
        plan.start,
        plan.end,
        if plan.reverse { " (reverse)" } else { "" }
    );

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let mut scraper = NovelScraper::new(config, storage)?;

    let summary = run_plan(&mut scraper, &plan).await?;
    tracing::info!(
        "Run finished: {} scraped, {} not found, {} R18 skipped",
        summary.scraped,
        summary.not_found,
        summary.skipped_r18
    );

    Ok(summary)
}
