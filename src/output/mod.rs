//! Output module for reporting on the novel database
//!
//! This module handles printing statistics about scrape progress and stored data.

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, ScrapeStatistics};
