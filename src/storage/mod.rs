//! Storage module for persisting scrape data
//!
//! This module handles all database operations for the scraper, including:
//! - SQLite database initialization and schema management
//! - The per-novel scrape history used for resuming runs
//! - Novel metadata, chapter text, and impression persistence

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::SubResource;
use crate::CrawlError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

/// Opens (creating if needed) a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlError> {
    SqliteStorage::new(path)
}

/// Deletes the database file, dropping every table at once
///
/// Returns `false` when there was no file to delete.
pub fn reset_storage(path: &Path) -> Result<bool, CrawlError> {
    let existed = remove_if_present(path)?;

    // WAL sidecars outlive a killed run
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_present(Path::new(&sidecar))?;
    }

    Ok(existed)
}

fn remove_if_present(path: &Path) -> Result<bool, CrawlError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Novel metadata from the info page
#[derive(Debug, Clone, PartialEq)]
pub struct NovelInfo {
    pub nid: String,
    pub title: String,
    pub summary: String,
    pub genre: String,
    pub keywords: Vec<String>,
    pub released_at: NaiveDateTime,
    pub last_updated_at: Option<NaiveDateTime>,
    pub impression_count: u32,
    pub review_count: u32,
    pub bookmark_count: u32,
    pub character_count: u32,
    /// Absent when the author keeps ratings private
    pub total_review_point: Option<i64>,
    pub review_point: Option<i64>,
    pub user_id: Option<i64>,
    /// Thread id used by the impression listing pages
    pub impression_id: i64,
}

/// One page of chapter text
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPage {
    pub nid: String,
    /// 1-based position within the novel
    pub page_num: u32,
    /// Chapter label; absent for novels without chapters
    pub part: Option<String>,
    pub title: String,
    pub content: String,
    pub pre_content: Option<String>,
    pub post_content: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_updated_at: Option<NaiveDateTime>,
}

/// One reader impression
#[derive(Debug, Clone, PartialEq)]
pub struct Impression {
    pub nid: String,
    /// Absent for anonymous or deleted users
    pub user_id: Option<i64>,
    pub created_at: NaiveDateTime,
    /// 一言
    pub comment: Option<String>,
    /// 良い点
    pub good_points: Option<String>,
    /// 気になる点
    pub concerns: Option<String>,
    pub on_part: Option<String>,
}

/// A row of the scrape history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub nid: String,
    pub r18: bool,
    pub last_info_scrape_at: Option<DateTime<Utc>>,
    pub last_impression_scrape_at: Option<DateTime<Utc>>,
    pub last_content_scrape_at: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    pub fn progress(&self) -> ScrapeProgress {
        ScrapeProgress {
            info_done: self.last_info_scrape_at.is_some(),
            impressions_done: self.last_impression_scrape_at.is_some(),
            content_done: self.last_content_scrape_at.is_some(),
        }
    }
}

/// Which sub-resources of a novel have completed at least once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeProgress {
    pub info_done: bool,
    pub impressions_done: bool,
    pub content_done: bool,
}

impl ScrapeProgress {
    pub fn is_done(&self, resource: SubResource) -> bool {
        match resource {
            SubResource::Info => self.info_done,
            SubResource::Impressions => self.impressions_done,
            SubResource::Content => self.content_done,
        }
    }
}
