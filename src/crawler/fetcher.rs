//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client (user agent, timeouts, age-confirmation cookie)
//! - Retry logic for transient failures
//! - Not-found detection

use crate::config::NetworkConfig;
use crate::CrawlError;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Cookie the site sets once a reader confirms their age
const OVER18_COOKIE: &str = "over18=yes";

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page body
    Body(String),

    /// HTTP 404; never retried
    NotFound,
}

impl FetchOutcome {
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Body(body) => Some(body),
            Self::NotFound => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static(OVER18_COOKIE));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches URLs one at a time, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 404 | Immediate → NotFound |
/// | Other HTTP error | Retry without waiting |
/// | Network error | Retry after `retry_delay` |
///
/// After `max_attempts` failed attempts the last failure is returned as
/// `CrawlError::RetriesExhausted`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self, CrawlError> {
        let client = build_http_client(config)?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Fetches a URL
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome::Body)` - Page body
    /// * `Ok(FetchOutcome::NotFound)` - The server answered 404
    /// * `Err(CrawlError::RetriesExhausted)` - Every attempt failed
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, CrawlError> {
        let mut last_failure = String::new();

        for attempt in 1..=self.max_attempts {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::NOT_FOUND {
                        tracing::warn!("404 error for {}", url);
                        return Ok(FetchOutcome::NotFound);
                    }

                    if !status.is_success() {
                        // No need to wait after an HTTP error
                        tracing::warn!(
                            "HTTP {} for {} (attempt {}/{})",
                            status.as_u16(),
                            url,
                            attempt,
                            self.max_attempts
                        );
                        last_failure = format!("HTTP {}", status.as_u16());
                        continue;
                    }

                    match response.text().await {
                        Ok(body) => return Ok(FetchOutcome::Body(body)),
                        Err(e) => {
                            tracing::warn!("Failed to read body of {}, retrying: {}", url, e);
                            last_failure = e.to_string();
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to request {} (attempt {}/{}), retrying: {}",
                        url,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    last_failure = e.to_string();
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::error!("Unable to complete the request {}: {}", url, last_failure);
        Err(CrawlError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            reason: last_failure,
        })
    }

    /// Fetches a page that must exist
    pub async fn fetch_required(&self, url: &str) -> Result<String, CrawlError> {
        self.fetch(url)
            .await?
            .into_body()
            .ok_or_else(|| CrawlError::UnexpectedNotFound {
                url: url.to_string(),
            })
    }
}
