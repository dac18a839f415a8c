//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::SubResource;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ContentPage, HistoryRecord, Impression, NovelInfo, ScrapeProgress};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        nid: row.get(0)?,
        r18: row.get(1)?,
        last_info_scrape_at: row.get(2)?,
        last_impression_scrape_at: row.get(3)?,
        last_content_scrape_at: row.get(4)?,
    })
}

fn join_keywords(keywords: &[String]) -> String {
    keywords.join(",")
}

fn split_keywords(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

impl Storage for SqliteStorage {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            return Err(StorageError::TransactionOpen);
        }
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.conn.is_autocommit() {
            return Err(StorageError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Scrape History =====

    fn ensure_tracked(&mut self, nid: &str, r18: bool) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO scrape_history (nid, r18) VALUES (?1, ?2)
             ON CONFLICT(nid) DO UPDATE SET r18 = excluded.r18",
            params![nid, r18],
        )?;
        Ok(())
    }

    fn get_history(&self, nid: &str) -> StorageResult<Option<HistoryRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT nid, r18, last_info_scrape_at, last_impression_scrape_at,
                 last_content_scrape_at FROM scrape_history WHERE nid = ?1",
                params![nid],
                history_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn get_progress(&self, nid: &str) -> StorageResult<ScrapeProgress> {
        Ok(self
            .get_history(nid)?
            .map(|record| record.progress())
            .unwrap_or_default())
    }

    fn mark_done(
        &mut self,
        nid: &str,
        resource: SubResource,
        when: DateTime<Utc>,
    ) -> StorageResult<()> {
        let column = resource.history_column();
        self.conn.execute(
            &format!(
                "INSERT INTO scrape_history (nid, {column}) VALUES (?1, ?2)
                 ON CONFLICT(nid) DO UPDATE SET {column} = excluded.{column}"
            ),
            params![nid, when],
        )?;
        Ok(())
    }

    // ===== Novel Data =====

    fn upsert_novel_info(&mut self, info: &NovelInfo) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO novel_info (nid, title, summary, keywords, genre, released_at,
             last_updated_at, impression_count, review_count, bookmark_count,
             total_review_point, review_point, character_count, user_id, impression_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(nid) DO UPDATE SET
                title = excluded.title,
                summary = excluded.summary,
                keywords = excluded.keywords,
                genre = excluded.genre,
                released_at = excluded.released_at,
                last_updated_at = excluded.last_updated_at,
                impression_count = excluded.impression_count,
                review_count = excluded.review_count,
                bookmark_count = excluded.bookmark_count,
                total_review_point = excluded.total_review_point,
                review_point = excluded.review_point,
                character_count = excluded.character_count,
                user_id = excluded.user_id,
                impression_id = excluded.impression_id",
            params![
                info.nid,
                info.title,
                info.summary,
                join_keywords(&info.keywords),
                info.genre,
                info.released_at,
                info.last_updated_at,
                info.impression_count,
                info.review_count,
                info.bookmark_count,
                info.total_review_point,
                info.review_point,
                info.character_count,
                info.user_id,
                info.impression_id,
            ],
        )?;
        Ok(())
    }

    fn upsert_impression(&mut self, impression: &Impression) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO novel_impression (nid, user_id, created_at, comment, good_points,
             concerns, on_part) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(nid, created_at) DO UPDATE SET
                user_id = excluded.user_id,
                comment = excluded.comment,
                good_points = excluded.good_points,
                concerns = excluded.concerns,
                on_part = excluded.on_part",
            params![
                impression.nid,
                impression.user_id,
                impression.created_at,
                impression.comment,
                impression.good_points,
                impression.concerns,
                impression.on_part,
            ],
        )?;
        Ok(())
    }

    fn upsert_content(&mut self, page: &ContentPage) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO novel_content (nid, page_num, part, title, content, pre_content,
             post_content, created_at, last_updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(nid, page_num) DO UPDATE SET
                part = excluded.part,
                title = excluded.title,
                content = excluded.content,
                pre_content = excluded.pre_content,
                post_content = excluded.post_content,
                created_at = excluded.created_at,
                last_updated_at = excluded.last_updated_at",
            params![
                page.nid,
                page.page_num,
                page.part,
                page.title,
                page.content,
                page.pre_content,
                page.post_content,
                page.created_at,
                page.last_updated_at,
            ],
        )?;
        Ok(())
    }

    fn truncate_content(&mut self, nid: &str, last_page: u32) -> StorageResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM novel_content WHERE nid = ?1 AND page_num > ?2",
            params![nid, last_page],
        )?;
        Ok(removed)
    }

    fn get_novel_info(&self, nid: &str) -> StorageResult<Option<NovelInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT nid, title, summary, keywords, genre, released_at, last_updated_at,
                 impression_count, review_count, bookmark_count, total_review_point,
                 review_point, character_count, user_id, impression_id
                 FROM novel_info WHERE nid = ?1",
                params![nid],
                |row| {
                    Ok(NovelInfo {
                        nid: row.get(0)?,
                        title: row.get(1)?,
                        summary: row.get(2)?,
                        keywords: split_keywords(&row.get::<_, String>(3)?),
                        genre: row.get(4)?,
                        released_at: row.get(5)?,
                        last_updated_at: row.get(6)?,
                        impression_count: row.get(7)?,
                        review_count: row.get(8)?,
                        bookmark_count: row.get(9)?,
                        total_review_point: row.get(10)?,
                        review_point: row.get(11)?,
                        character_count: row.get(12)?,
                        user_id: row.get(13)?,
                        impression_id: row.get(14)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    fn get_impressions(&self, nid: &str) -> StorageResult<Vec<Impression>> {
        let mut stmt = self.conn.prepare(
            "SELECT nid, user_id, created_at, comment, good_points, concerns, on_part
             FROM novel_impression WHERE nid = ?1 ORDER BY created_at",
        )?;

        let impressions = stmt
            .query_map(params![nid], |row| {
                Ok(Impression {
                    nid: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: row.get(2)?,
                    comment: row.get(3)?,
                    good_points: row.get(4)?,
                    concerns: row.get(5)?,
                    on_part: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(impressions)
    }

    fn get_content_pages(&self, nid: &str) -> StorageResult<Vec<ContentPage>> {
        let mut stmt = self.conn.prepare(
            "SELECT nid, page_num, part, title, content, pre_content, post_content,
             created_at, last_updated_at
             FROM novel_content WHERE nid = ?1 ORDER BY page_num",
        )?;

        let pages = stmt
            .query_map(params![nid], |row| {
                Ok(ContentPage {
                    nid: row.get(0)?,
                    page_num: row.get(1)?,
                    part: row.get(2)?,
                    title: row.get(3)?,
                    content: row.get(4)?,
                    pre_content: row.get(5)?,
                    post_content: row.get(6)?,
                    created_at: row.get(7)?,
                    last_updated_at: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    // ===== Statistics =====

    fn count_tracked(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM scrape_history")
    }

    fn count_r18(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM scrape_history WHERE r18 = 1")
    }

    fn count_done(&self, resource: SubResource) -> StorageResult<u64> {
        self.count(&format!(
            "SELECT COUNT(*) FROM scrape_history WHERE {} IS NOT NULL",
            resource.history_column()
        ))
    }

    fn count_novels(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM novel_info")
    }

    fn count_impressions(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM novel_impression")
    }

    fn count_content_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM novel_content")
    }
}
