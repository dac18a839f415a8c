//! URL construction for the site's pages

use crate::config::EndpointsConfig;
use crate::nid::Nid;
use crate::CrawlError;
use url::Url;

/// Builds page URLs from the configured hosts
#[derive(Debug, Clone)]
pub struct SiteUrls {
    endpoints: EndpointsConfig,
}

fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

impl SiteUrls {
    pub fn new(endpoints: &EndpointsConfig) -> Self {
        Self {
            endpoints: endpoints.clone(),
        }
    }

    fn novel_host(&self, r18: bool) -> &str {
        if r18 {
            base(&self.endpoints.novel18)
        } else {
            base(&self.endpoints.ncode)
        }
    }

    /// Novel info page, the entry point of every scrape
    pub fn info_page(&self, nid: &Nid, r18: bool) -> String {
        format!(
            "{}/novelview/infotop/ncode/{}/",
            self.novel_host(r18),
            nid.to_url_segment()
        )
    }

    /// Novel top page: the table of contents, or the whole text for single-page novels
    pub fn toc_page(&self, nid: &Nid, r18: bool) -> String {
        format!("{}/{}/", self.novel_host(r18), nid.to_url_segment())
    }

    /// One page of a novel's impression listing (1-based)
    pub fn impression_page(&self, impression_id: i64, r18: bool, page: u32) -> String {
        let host = if r18 {
            base(&self.endpoints.novelcom18)
        } else {
            base(&self.endpoints.novelcom)
        };

        let url = format!("{}/impression/list/ncode/{}/", host, impression_id);
        if page > 1 {
            format!("{}?p={}", url, page)
        } else {
            url
        }
    }

    /// Novel API query returning the author id
    pub fn user_api(&self, nid: &Nid) -> String {
        format!(
            "{}/novelapi/api/?ncode={}&of=u&out=json",
            base(&self.endpoints.api),
            nid.to_url_segment()
        )
    }

    /// Resolves a chapter link against the table of contents it came from
    pub fn resolve(&self, toc_url: &str, href: &str) -> Result<String, CrawlError> {
        Ok(Url::parse(toc_url)?.join(href)?.to_string())
    }
}
