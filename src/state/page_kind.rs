/// Classification of a fetched novel info page
///
/// The site answers removed novels and age-restricted novels with ordinary
/// HTML pages, so the page title is what tells them apart.

/// Title of the page served for removed or invalid novels
pub const ERROR_PAGE_TITLE: &str = "エラー";

/// Title of the age confirmation page served for R18 novels
pub const AGE_CONFIRMATION_TITLE: &str = "年齢確認";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// No novel behind this identifier
    NotFound,

    /// Age confirmation required before the real page is served
    AgeGated,

    /// A regular info page
    Normal,
}

impl PageKind {
    /// Classifies a page by its `<title>` text
    pub fn from_title(title: Option<&str>) -> Self {
        match title.map(str::trim) {
            Some(ERROR_PAGE_TITLE) => Self::NotFound,
            Some(AGE_CONFIRMATION_TITLE) => Self::AgeGated,
            _ => Self::Normal,
        }
    }
}
