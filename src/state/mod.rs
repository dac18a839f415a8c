//! State module for classifying pages and tracking scrape progress
//!
//! # Components
//!
//! - `PageKind`: What a fetched info page turned out to be (missing, age-gated, normal)
//! - `SubResource`: The three parts of a novel whose completion is recorded separately

mod page_kind;
mod sub_resource;

pub use page_kind::{PageKind, AGE_CONFIRMATION_TITLE, ERROR_PAGE_TITLE};
pub use sub_resource::SubResource;
