//! Novel info page extraction

use crate::extract::text::{last_path_segment, parse_count, parse_points, parse_site_datetime};
use crate::extract::{element_text, select_text, selector, ExtractError, ExtractResult};
use crate::storage::NovelInfo;
use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Collects `<th>` -> `<td>` text for every table row on the page
fn table_cells(document: &Html) -> ExtractResult<HashMap<String, String>> {
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let mut cells = HashMap::new();
    for row in document.select(&row_sel) {
        let header = row.select(&th_sel).next().map(element_text);
        let cell = row
            .select(&td_sel)
            .next()
            .map(|td| td.text().collect::<String>());

        if let (Some(header), Some(cell)) = (header, cell) {
            cells.entry(header).or_insert(cell);
        }
    }
    Ok(cells)
}

fn impression_id(document: &Html) -> ExtractResult<i64> {
    let nav_link_sel = selector("#head_nav a")?;
    let href = document
        .select(&nav_link_sel)
        .nth(2)
        .and_then(|a| a.value().attr("href"))
        .ok_or(ExtractError::MissingField("impression_id"))?;

    last_path_segment(href)
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ExtractError::InvalidField {
            field: "impression_id",
            value: href.to_string(),
        })
}

/// Author id from the link under the title; some pages have no such link
fn user_id(document: &Html) -> ExtractResult<Option<i64>> {
    let link_sel = selector("ul.undernavi a")?;
    Ok(document
        .select(&link_sel)
        .next()
        .and_then(|a: ElementRef<'_>| a.value().attr("href"))
        .and_then(last_path_segment)
        .and_then(|segment| segment.parse().ok()))
}

fn keywords(cell: Option<&String>) -> Vec<String> {
    cell.map(|text| {
        text.replace('\u{a0}', "")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Extracts novel metadata from an info page
///
/// `user_id` is `None` when the page has no author link; callers look it up elsewhere.
pub fn extract_novel_info(nid: &str, html: &str) -> ExtractResult<NovelInfo> {
    let document = Html::parse_document(html);
    let cells = table_cells(&document)?;

    let cell = |header: &str| cells.get(header).map(|s| s.trim().to_string());
    let required = |header: &str, field: &'static str| {
        cells
            .get(header)
            .cloned()
            .ok_or(ExtractError::MissingField(field))
    };

    let title =
        select_text(&document, "h1 a")?.ok_or(ExtractError::MissingField("title"))?;
    let summary =
        select_text(&document, "td.ex")?.ok_or(ExtractError::MissingField("summary"))?;

    let released_at = parse_site_datetime("released_at", &required("掲載日", "released_at")?)?;
    let last_updated_at = cell("最新部分掲載日")
        .map(|value| parse_site_datetime("last_updated_at", &value))
        .transpose()?;

    Ok(NovelInfo {
        nid: nid.to_string(),
        title,
        summary,
        // Some R18 pages have no genre row
        genre: cell("ジャンル").unwrap_or_default(),
        keywords: keywords(cells.get("キーワード")),
        released_at,
        last_updated_at,
        impression_count: parse_count("impression_count", &required("感想", "impression_count")?, "件")?,
        review_count: parse_count("review_count", &required("レビュー", "review_count")?, "件")?,
        bookmark_count: parse_count(
            "bookmark_count",
            &required("ブックマーク登録", "bookmark_count")?,
            "件",
        )?,
        character_count: parse_count(
            "character_count",
            &required("文字数", "character_count")?,
            "文字",
        )?,
        total_review_point: cell("総合評価").as_deref().and_then(parse_points),
        review_point: cell("評価ポイント").as_deref().and_then(parse_points),
        user_id: user_id(&document)?,
        impression_id: impression_id(&document)?,
    })
}

/// Reads the author id from a novel API response (`out=json`, `of=u`)
///
/// The response is a JSON array whose first element holds the result count and
/// whose second element is the novel.
pub fn parse_api_user_id(body: &str) -> ExtractResult<i64> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ExtractError::Api(e.to_string()))?;

    value
        .get(1)
        .and_then(|novel| novel.get("userid"))
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| ExtractError::Api(format!("no userid in {}", body)))
}
