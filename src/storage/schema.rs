//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the novel database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Per-novel scrape progress
CREATE TABLE IF NOT EXISTS scrape_history (
    nid TEXT PRIMARY KEY,
    r18 INTEGER NOT NULL DEFAULT 0,
    last_info_scrape_at TEXT,
    last_impression_scrape_at TEXT,
    last_content_scrape_at TEXT
);

-- Novel metadata
CREATE TABLE IF NOT EXISTS novel_info (
    nid TEXT PRIMARY KEY REFERENCES scrape_history(nid),
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    keywords TEXT NOT NULL,
    genre TEXT NOT NULL,
    released_at TEXT NOT NULL,
    last_updated_at TEXT,
    impression_count INTEGER NOT NULL,
    review_count INTEGER NOT NULL,
    bookmark_count INTEGER NOT NULL,
    total_review_point INTEGER,
    review_point INTEGER,
    character_count INTEGER NOT NULL,
    user_id INTEGER,
    impression_id INTEGER NOT NULL
);

-- Chapter text, one row per page
CREATE TABLE IF NOT EXISTS novel_content (
    nid TEXT NOT NULL REFERENCES novel_info(nid),
    page_num INTEGER NOT NULL,
    part TEXT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    pre_content TEXT,
    post_content TEXT,
    created_at TEXT NOT NULL,
    last_updated_at TEXT,
    PRIMARY KEY (nid, page_num)
);

-- Reader impressions
CREATE TABLE IF NOT EXISTS novel_impression (
    nid TEXT NOT NULL REFERENCES novel_info(nid),
    user_id INTEGER,
    created_at TEXT NOT NULL,
    comment TEXT,
    good_points TEXT,
    concerns TEXT,
    on_part TEXT,
    PRIMARY KEY (nid, created_at)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
