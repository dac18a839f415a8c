//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::SubResource;
use crate::storage::{ContentPage, HistoryRecord, Impression, NovelInfo, ScrapeProgress};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No transaction is open")]
    NoTransaction,

    #[error("A transaction is already open")]
    TransactionOpen,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The scraper is the only writer. Writes are idempotent upserts, except
/// `ensure_tracked`, which never touches existing progress timestamps.
pub trait Storage {
    // ===== Transactions =====

    /// Opens the transaction covering one novel's scrape
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the open transaction
    fn commit(&mut self) -> StorageResult<()>;

    /// Rolls back the open transaction, if any
    fn rollback(&mut self) -> StorageResult<()>;

    // ===== Scrape History =====

    /// Records a novel in the history if absent
    ///
    /// An existing row keeps its progress timestamps; only the r18 flag is replaced.
    fn ensure_tracked(&mut self, nid: &str, r18: bool) -> StorageResult<()>;

    /// Gets the history row for a novel
    fn get_history(&self, nid: &str) -> StorageResult<Option<HistoryRecord>>;

    /// Gets what has already been scraped for a novel (all false when untracked)
    fn get_progress(&self, nid: &str) -> StorageResult<ScrapeProgress>;

    /// Sets the completion time of one sub-resource
    fn mark_done(
        &mut self,
        nid: &str,
        resource: SubResource,
        when: DateTime<Utc>,
    ) -> StorageResult<()>;

    // ===== Novel Data =====

    fn upsert_novel_info(&mut self, info: &NovelInfo) -> StorageResult<()>;

    fn upsert_impression(&mut self, impression: &Impression) -> StorageResult<()>;

    fn upsert_content(&mut self, page: &ContentPage) -> StorageResult<()>;

    /// Deletes content pages numbered above `last_page`; returns how many went
    fn truncate_content(&mut self, nid: &str, last_page: u32) -> StorageResult<usize>;

    fn get_novel_info(&self, nid: &str) -> StorageResult<Option<NovelInfo>>;

    /// Gets all impressions of a novel, oldest first
    fn get_impressions(&self, nid: &str) -> StorageResult<Vec<Impression>>;

    /// Gets all content pages of a novel in page order
    fn get_content_pages(&self, nid: &str) -> StorageResult<Vec<ContentPage>>;

    // ===== Statistics =====

    /// Counts novels present in the scrape history
    fn count_tracked(&self) -> StorageResult<u64>;

    /// Counts novels recorded as age-restricted
    fn count_r18(&self) -> StorageResult<u64>;

    /// Counts novels with the given sub-resource done
    fn count_done(&self, resource: SubResource) -> StorageResult<u64>;

    fn count_novels(&self) -> StorageResult<u64>;

    fn count_impressions(&self) -> StorageResult<u64>;

    fn count_content_pages(&self) -> StorageResult<u64>;
}
