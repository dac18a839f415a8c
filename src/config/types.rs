use serde::Deserialize;

/// Main configuration structure for narou-crawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub network: NetworkConfig,
    pub endpoints: EndpointsConfig,
    pub output: OutputConfig,
}

/// What to scrape and what to leave out
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScrapeConfig {
    /// First identifier of the range, inclusive
    pub start_from: String,

    /// Last identifier of the range, inclusive
    pub end_with: String,

    /// Single identifier to scrape; overrides the range when set
    pub nid: Option<String>,

    /// Do not scrape age-restricted novels past recording them
    pub skip_r18: bool,

    /// Do not scrape chapter text
    pub skip_content: bool,

    /// Do not scrape reader impressions
    pub skip_impressions: bool,

    /// Do not rescrape impressions or content already marked done
    pub skip_scraped: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_from: "N9999ZZ".to_string(),
            end_with: "N0000AA".to_string(),
            nid: None,
            skip_r18: false,
            skip_content: false,
            skip_impressions: false,
            skip_scraped: false,
        }
    }
}

/// HTTP behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Attempts per URL before giving up
    pub max_attempts: u32,

    /// Pause after a failed connection attempt (milliseconds)
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 1000,
            timeout_secs: 30,
            user_agent: format!("narou-crawl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Base URLs of the site's hosts
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointsConfig {
    /// Novel pages
    pub ncode: String,

    /// Age-restricted novel pages
    pub novel18: String,

    /// Impression listings
    pub novelcom: String,

    /// Age-restricted impression listings
    pub novelcom18: String,

    /// Novel search API
    pub api: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            ncode: "https://ncode.syosetu.com".to_string(),
            novel18: "https://novel18.syosetu.com".to_string(),
            novelcom: "https://novelcom.syosetu.com".to_string(),
            novelcom18: "https://novelcom18.syosetu.com".to_string(),
            api: "https://api.syosetu.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Path to the log file
    pub log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "novels.db".to_string(),
            log_file: "scrape.log".to_string(),
        }
    }
}

/// Values given on the command line; `None`/`false` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_from: Option<String>,
    pub end_with: Option<String>,
    pub nid: Option<String>,
    pub skip_r18: bool,
    pub skip_content: bool,
    pub skip_impressions: bool,
    pub skip_scraped: bool,
    pub database_path: Option<String>,
    pub log_file: Option<String>,
}

impl Config {
    /// Applies command-line overrides on top of the loaded values
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(start) = &overrides.start_from {
            self.scrape.start_from = start.clone();
        }
        if let Some(end) = &overrides.end_with {
            self.scrape.end_with = end.clone();
        }
        if let Some(nid) = &overrides.nid {
            self.scrape.nid = Some(nid.clone());
        }
        self.scrape.skip_r18 |= overrides.skip_r18;
        self.scrape.skip_content |= overrides.skip_content;
        self.scrape.skip_impressions |= overrides.skip_impressions;
        self.scrape.skip_scraped |= overrides.skip_scraped;
        if let Some(path) = &overrides.database_path {
            self.output.database_path = path.clone();
        }
        if let Some(path) = &overrides.log_file {
            self.output.log_file = path.clone();
        }
    }
}
