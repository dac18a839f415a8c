/// Sub-resource definitions for tracking scrape progress
///
/// Every novel has three independently scraped parts, each with its own
/// completion timestamp in the scrape history.
use std::fmt;

/// One independently scrapable part of a novel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubResource {
    /// Novel metadata from the info page
    Info,

    /// Reader impressions (comment threads)
    Impressions,

    /// Chapter text
    Content,
}

impl SubResource {
    /// All sub-resources in the order they are scraped
    pub const ALL: [SubResource; 3] = [Self::Info, Self::Impressions, Self::Content];

    /// Name of the scrape-history column holding this sub-resource's completion time
    pub fn history_column(&self) -> &'static str {
        match self {
            Self::Info => "last_info_scrape_at",
            Self::Impressions => "last_impression_scrape_at",
            Self::Content => "last_content_scrape_at",
        }
    }
}

impl fmt::Display for SubResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Impressions => "impressions",
            Self::Content => "content",
        };
        write!(f, "{}", s)
    }
}
