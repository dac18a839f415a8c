//! Impression listing extraction

use crate::extract::text::{find_site_datetime, first_number, last_path_segment};
use crate::extract::{element_text, selector, ExtractError, ExtractResult};
use crate::storage::Impression;
use scraper::{ElementRef, Html};

/// Number of listing pages for a novel's impressions, read from its first page
///
/// - navigation present: the largest page number linked from it (at least 1)
/// - no navigation but a comment block: exactly one page
/// - neither: no impressions at all
pub fn impression_page_count(html: &str) -> ExtractResult<u32> {
    let document = Html::parse_document(html);
    let nav_sel = selector(".naviall")?;
    let link_sel = selector("a")?;
    let comment_sel = selector(".comment")?;

    match document.select(&nav_sel).next() {
        Some(nav) => Ok(nav
            .select(&link_sel)
            .filter_map(|a| first_number(&element_text(a)))
            .max()
            .unwrap_or(1)
            .max(1)),
        None if document.select(&comment_sel).next().is_some() => Ok(1),
        None => Ok(0),
    }
}

fn extract_one(nid: &str, block: ElementRef<'_>) -> ExtractResult<Impression> {
    let author_sel = selector("div.comment_info.comment_authorbox")?;
    let link_sel = selector("a")?;
    let on_part_sel = selector("span.no_posted_impression")?;
    let header_sel = selector("div.comment_h2")?;

    let author = block
        .select(&author_sel)
        .next()
        .ok_or(ExtractError::MissingField("comment_authorbox"))?;

    // Logged-out and deleted users have no numeric profile link
    let user_id = author
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(last_path_segment)
        .and_then(|segment| segment.parse().ok());

    let author_text = author.text().collect::<String>();
    let created_at =
        find_site_datetime(&author_text).ok_or_else(|| ExtractError::InvalidField {
            field: "impression created_at",
            value: author_text.trim().to_string(),
        })?;

    let mut impression = Impression {
        nid: nid.to_string(),
        user_id,
        created_at,
        comment: None,
        good_points: None,
        concerns: None,
        on_part: block.select(&on_part_sel).next().map(element_text),
    };

    for header in block.select(&header_sel) {
        let body = header
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(|div| div.text().collect::<String>());

        match element_text(header).as_str() {
            "一言" => impression.comment = body,
            "良い点" => impression.good_points = body,
            "気になる点" => impression.concerns = body,
            _ => {}
        }
    }

    Ok(impression)
}

/// Extracts every impression on one listing page
pub fn extract_impressions(nid: &str, html: &str) -> ExtractResult<Vec<Impression>> {
    let document = Html::parse_document(html);
    let block_sel = selector(".waku")?;

    document
        .select(&block_sel)
        .map(|block| extract_one(nid, block))
        .collect()
}
