//! Per-novel scrape orchestration
//!
//! For one identifier this module:
//! - Fetches and classifies the info page (not found / age gated / normal)
//! - Records age-restricted novels in the scrape history before anything else
//! - Stores metadata, then impressions, then chapter text, each followed by its
//!   history timestamp
//! - Commits everything for the novel in one transaction, or rolls it back on failure

use crate::config::{Config, ScrapeConfig};
use crate::crawler::endpoints::SiteUrls;
use crate::crawler::fetcher::Fetcher;
use crate::extract::{
    classify_page, extract_body, extract_impressions, extract_novel_info,
    impression_page_count, parse_api_user_id, parse_table_of_contents, ExtractError,
};
use crate::nid::Nid;
use crate::state::{PageKind, SubResource};
use crate::storage::{ContentPage, NovelInfo, ScrapeProgress, SqliteStorage, Storage};
use crate::CrawlError;
use chrono::Utc;

/// How the scrape of one identifier ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// No novel behind the identifier; nothing was written
    NotFound,

    /// Age-restricted novel left alone after recording it
    SkippedR18,

    /// Metadata stored; `None` counts mean the sub-resource was skipped
    Scraped {
        impressions: Option<usize>,
        pages: Option<usize>,
    },
}

/// Decides whether a sub-resource is left out of this scrape
///
/// Metadata is always scraped. Impressions and content are skipped when
/// switched off, or when `skip_scraped` is set and the history says they are done.
pub fn should_skip(options: &ScrapeConfig, resource: SubResource, progress: &ScrapeProgress) -> bool {
    let switched_off = match resource {
        SubResource::Info => return false,
        SubResource::Impressions => options.skip_impressions,
        SubResource::Content => options.skip_content,
    };

    switched_off || (options.skip_scraped && progress.is_done(resource))
}

/// Scrapes novels one identifier at a time into a single store
pub struct NovelScraper<'a> {
    options: &'a ScrapeConfig,
    urls: SiteUrls,
    fetcher: Fetcher,
    storage: SqliteStorage,
}

impl<'a> NovelScraper<'a> {
    /// Creates a scraper writing into `storage`
    pub fn new(config: &'a Config, storage: SqliteStorage) -> Result<Self, CrawlError> {
        Ok(Self {
            options: &config.scrape,
            urls: SiteUrls::new(&config.endpoints),
            fetcher: Fetcher::new(&config.network)?,
            storage,
        })
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn into_storage(self) -> SqliteStorage {
        self.storage
    }

    /// Scrapes one novel
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeOutcome)` - The novel was handled (including "nothing there")
    /// * `Err(CrawlError)` - A fetch or page failed; the novel's transaction was rolled back
    pub async fn scrape(&mut self, nid: &Nid) -> Result<ScrapeOutcome, CrawlError> {
        let key = nid.to_string();

        let page = match self.fetcher.fetch(&self.urls.info_page(nid, false)).await?.into_body() {
            Some(page) => page,
            None => {
                tracing::info!("Novel {} not found", key);
                return Ok(ScrapeOutcome::NotFound);
            }
        };

        let (r18, page) = match classify_page(&page) {
            PageKind::NotFound => {
                tracing::info!("Novel {} returned error page", key);
                return Ok(ScrapeOutcome::NotFound);
            }
            PageKind::Normal => (false, page),
            PageKind::AgeGated => {
                // Committed on its own so the classification survives a skip or a failure
                self.storage.ensure_tracked(&key, true)?;

                if self.options.skip_r18 {
                    tracing::info!("Skip R18 novel {}", key);
                    return Ok(ScrapeOutcome::SkippedR18);
                }

                let page = self
                    .fetcher
                    .fetch_required(&self.urls.info_page(nid, true))
                    .await?;
                (true, page)
            }
        };

        self.storage.begin()?;
        match self.scrape_novel(nid, &key, r18, &page).await {
            Ok(outcome) => {
                self.storage.commit()?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = self.storage.rollback() {
                    tracing::warn!("Rollback failed for {}: {}", key, rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn scrape_novel(
        &mut self,
        nid: &Nid,
        key: &str,
        r18: bool,
        page: &str,
    ) -> Result<ScrapeOutcome, CrawlError> {
        if !r18 {
            self.storage.ensure_tracked(key, false)?;
        }
        let progress = self.storage.get_progress(key)?;

        let mut info = extract_novel_info(key, page).map_err(|e| extract_error(key, e))?;
        if info.user_id.is_none() {
            info.user_id = Some(self.lookup_user_id(nid, key).await?);
        }
        self.storage.upsert_novel_info(&info)?;
        self.storage.mark_done(key, SubResource::Info, Utc::now())?;

        let impressions = if should_skip(self.options, SubResource::Impressions, &progress) {
            tracing::debug!("Skipping impressions of {}", key);
            None
        } else {
            let saved = self.scrape_impressions(key, info.impression_id, r18).await?;
            self.storage
                .mark_done(key, SubResource::Impressions, Utc::now())?;
            Some(saved)
        };

        let pages = if should_skip(self.options, SubResource::Content, &progress) {
            tracing::debug!("Skipping content of {}", key);
            None
        } else {
            let saved = self.scrape_content(nid, key, &info, r18).await?;
            self.storage.mark_done(key, SubResource::Content, Utc::now())?;
            Some(saved)
        };

        Ok(ScrapeOutcome::Scraped { impressions, pages })
    }

    /// Some info pages carry no author link; the novel API always has the id
    async fn lookup_user_id(&self, nid: &Nid, key: &str) -> Result<i64, CrawlError> {
        tracing::debug!("No author link for {}, asking the novel API", key);
        let body = self.fetcher.fetch_required(&self.urls.user_api(nid)).await?;
        parse_api_user_id(&body).map_err(|e| extract_error(key, e))
    }

    async fn scrape_impressions(
        &mut self,
        key: &str,
        impression_id: i64,
        r18: bool,
    ) -> Result<usize, CrawlError> {
        let first = self
            .fetcher
            .fetch_required(&self.urls.impression_page(impression_id, r18, 1))
            .await?;

        let page_count = impression_page_count(&first).map_err(|e| extract_error(key, e))?;
        if page_count == 0 {
            return Ok(0);
        }

        let mut saved = self.save_impressions(key, &first)?;

        for page_num in 2..=page_count {
            tracing::info!(
                "Mass impression; getting impression page {} of {} for {}",
                page_num,
                page_count,
                key
            );
            let html = self
                .fetcher
                .fetch_required(&self.urls.impression_page(impression_id, r18, page_num))
                .await?;
            saved += self.save_impressions(key, &html)?;
        }

        Ok(saved)
    }

    fn save_impressions(&mut self, key: &str, html: &str) -> Result<usize, CrawlError> {
        let impressions = extract_impressions(key, html).map_err(|e| extract_error(key, e))?;
        for impression in &impressions {
            self.storage.upsert_impression(impression)?;
        }
        Ok(impressions.len())
    }

    async fn scrape_content(
        &mut self,
        nid: &Nid,
        key: &str,
        info: &NovelInfo,
        r18: bool,
    ) -> Result<usize, CrawlError> {
        let toc_url = self.urls.toc_page(nid, r18);
        let toc_html = self.fetcher.fetch_required(&toc_url).await?;

        let entries = parse_table_of_contents(&toc_html).map_err(|e| extract_error(key, e))?;

        let Some(entries) = entries else {
            // Single-page novel: the top page is the text
            let body = extract_body(&toc_html).map_err(|e| extract_error(key, e))?;
            self.storage.upsert_content(&ContentPage {
                nid: key.to_string(),
                page_num: 1,
                part: None,
                title: info.title.clone(),
                content: body.content,
                pre_content: body.pre_content,
                post_content: body.post_content,
                created_at: info.released_at,
                last_updated_at: info.last_updated_at,
            })?;
            self.drop_stale_pages(key, 1)?;
            return Ok(1);
        };

        let total = entries.len();
        for (idx, entry) in entries.into_iter().enumerate() {
            let url = self.urls.resolve(&toc_url, &entry.href)?;
            let html = self.fetcher.fetch_required(&url).await?;
            let body = extract_body(&html).map_err(|e| extract_error(key, e))?;

            let page_num = idx as u32 + 1;
            self.storage.upsert_content(&ContentPage {
                nid: key.to_string(),
                page_num,
                part: entry.part,
                title: entry.title,
                content: body.content,
                pre_content: body.pre_content,
                post_content: body.post_content,
                created_at: entry.created_at,
                last_updated_at: entry.last_updated_at,
            })?;
            tracing::info!("[{}/{}] {}", page_num, total, key);
        }

        self.drop_stale_pages(key, total as u32)?;
        Ok(total)
    }

    /// Removes pages left over from a longer table of contents
    fn drop_stale_pages(&mut self, key: &str, total: u32) -> Result<(), CrawlError> {
        let removed = self.storage.truncate_content(key, total)?;
        if removed > 0 {
            tracing::info!("Removed {} stale pages of {}", removed, key);
        }
        Ok(())
    }
}

fn extract_error(nid: &str, source: ExtractError) -> CrawlError {
    CrawlError::Extract {
        nid: nid.to_string(),
        source,
    }
}
