//! Narou-Crawl: a resumable scraper for a serial-fiction site
//!
//! This crate walks novel identifiers in the site's own enumeration order, classifies each
//! info page, and stores metadata, reader impressions, and chapter text in SQLite while
//! recording per-novel progress so an interrupted run can pick up where it stopped.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod nid;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Narou-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identifier error: {0}")]
    Nid(#[from] NidError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Giving up on {url} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Page not found: {url}")]
    UnexpectedNotFound { url: String },

    #[error("Malformed page for {nid}: {source}")]
    Extract {
        nid: String,
        #[source]
        source: extract::ExtractError,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid novel identifier in config: {0}")]
    InvalidNid(String),
}

/// Result type alias for Narou-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use nid::{Nid, NidError, NidSequence};
pub use state::{PageKind, SubResource};
