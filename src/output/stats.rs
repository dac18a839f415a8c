//! Statistics generation from the novel database
//!
//! This module provides functionality for extracting and displaying
//! scrape progress and row counts from the storage layer.

use crate::state::SubResource;
use crate::storage::Storage;
use crate::CrawlError;
use std::fmt::Write;

/// Scrape statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStatistics {
    /// Novels present in the scrape history
    pub tracked: u64,

    /// Novels recorded as age-restricted
    pub r18: u64,

    /// Novels whose metadata has been scraped
    pub info_done: u64,

    /// Novels whose impressions have been scraped
    pub impressions_done: u64,

    /// Novels whose content has been scraped
    pub content_done: u64,

    /// Rows in the metadata table
    pub novels: u64,

    /// Rows in the impression table
    pub impressions: u64,

    /// Rows in the content table
    pub content_pages: u64,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<ScrapeStatistics, CrawlError> {
    Ok(ScrapeStatistics {
        tracked: storage.count_tracked()?,
        r18: storage.count_r18()?,
        info_done: storage.count_done(SubResource::Info)?,
        impressions_done: storage.count_done(SubResource::Impressions)?,
        content_done: storage.count_done(SubResource::Content)?,
        novels: storage.count_novels()?,
        impressions: storage.count_impressions()?,
        content_pages: storage.count_content_pages()?,
    })
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Renders statistics as the text printed by `--stats`
pub fn format_statistics(stats: &ScrapeStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Scrape Statistics ===\n");

    let _ = writeln!(out, "Scrape History:");
    let _ = writeln!(out, "  Novels tracked: {}", stats.tracked);
    let _ = writeln!(
        out,
        "  R18 novels: {} ({:.1}%)",
        stats.r18,
        percentage(stats.r18, stats.tracked)
    );
    for (label, count) in [
        ("Info scraped", stats.info_done),
        ("Impressions scraped", stats.impressions_done),
        ("Content scraped", stats.content_done),
    ] {
        let _ = writeln!(
            out,
            "  {}: {} ({:.1}%)",
            label,
            count,
            percentage(count, stats.tracked)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Stored Rows:");
    let _ = writeln!(out, "  Novels: {}", stats.novels);
    let _ = writeln!(out, "  Impressions: {}", stats.impressions);
    let _ = writeln!(out, "  Content pages: {}", stats.content_pages);

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ScrapeStatistics) {
    print!("{}", format_statistics(stats));
}
