//! Configuration module for narou-crawl
//!
//! Settings come from an optional TOML file with command-line overrides on top.
//!
//! # Example
//!
//! ```no_run
//! use narou_crawl::config::{resolve_config, Overrides};
//! use std::path::Path;
//!
//! let config = resolve_config(Some(Path::new("narou.toml")), &Overrides::default()).unwrap();
//! println!("Scraping from {}", config.scrape.start_from);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EndpointsConfig, NetworkConfig, OutputConfig, Overrides, ScrapeConfig,
};

// Re-export parser functions
pub use parser::{load_config, resolve_config};
