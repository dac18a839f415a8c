//! Page extractors
//!
//! This module turns fetched HTML into typed records:
//! - Page classification (error / age confirmation / normal)
//! - Novel metadata from the info page
//! - Impression listings and their page count
//! - Table of contents and chapter bodies

mod content;
mod impressions;
mod info;
mod text;

pub use content::{extract_body, parse_table_of_contents, PageBody, TocEntry};
pub use impressions::{extract_impressions, impression_page_count};
pub use info::{extract_novel_info, parse_api_user_id};

use crate::state::PageKind;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors raised when a page does not have the expected layout
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Unexpected API response: {0}")]
    Api(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

/// Collected, trimmed text of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_text(document: &Html, css: &str) -> ExtractResult<Option<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(element_text))
}

/// Extracts the `<title>` text of a page
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    select_text(&document, "title").ok().flatten()
}

/// Classifies an info page by its title
pub fn classify_page(html: &str) -> PageKind {
    PageKind::from_title(page_title(html).as_deref())
}
