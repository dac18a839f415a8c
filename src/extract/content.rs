//! Table of contents and chapter body extraction

use crate::extract::text::parse_toc_datetime;
use crate::extract::{element_text, selector, ExtractError, ExtractResult};
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html};
use unicode_normalization::UnicodeNormalization;

/// One chapter link from a novel's table of contents
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Label of the enclosing chapter, if the novel groups pages into chapters
    pub part: Option<String>,
    pub title: String,
    /// Link to the page, relative to the table of contents
    pub href: String,
    pub created_at: NaiveDateTime,
    pub last_updated_at: Option<NaiveDateTime>,
}

/// Text blocks of one chapter page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBody {
    pub pre_content: Option<String>,
    pub content: String,
    pub post_content: Option<String>,
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn parse_entry(entry: ElementRef<'_>, part: &Option<String>) -> ExtractResult<TocEntry> {
    let link_sel = selector("dd a")?;
    let date_sel = selector("dt")?;
    let revised_sel = selector("span")?;

    let link = entry
        .select(&link_sel)
        .next()
        .ok_or(ExtractError::MissingField("chapter link"))?;
    let href = link
        .value()
        .attr("href")
        .ok_or(ExtractError::MissingField("chapter href"))?
        .to_string();

    let dt = entry
        .select(&date_sel)
        .next()
        .ok_or(ExtractError::MissingField("chapter date"))?;

    // `2023/04/01 12:00（改）`
    let dt_text = dt.text().collect::<String>();
    let created = dt_text.split('（').next().unwrap_or("");
    let created_at = parse_toc_datetime("chapter created_at", created)?;

    // `<span title="2023/04/05 09:00 改稿">`
    let last_updated_at = dt
        .select(&revised_sel)
        .next()
        .and_then(|span| span.value().attr("title"))
        .map(|title| {
            let stamp = title.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
            parse_toc_datetime("chapter last_updated_at", &stamp)
        })
        .transpose()?;

    Ok(TocEntry {
        part: part.clone(),
        title: element_text(link),
        href,
        created_at,
        last_updated_at,
    })
}

/// Parses a novel's table of contents
///
/// Returns `None` for single-page novels, whose top page is the body itself.
pub fn parse_table_of_contents(html: &str) -> ExtractResult<Option<Vec<TocEntry>>> {
    let document = Html::parse_document(html);
    let index_sel = selector(".index_box")?;

    let Some(index) = document.select(&index_sel).next() else {
        return Ok(None);
    };

    let mut part = None;
    let mut entries = Vec::new();

    for child in index.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "div" if has_class(&child, "chapter_title") => {
                // Full-width spaces and compatibility forms are decomposed
                part = Some(element_text(child).nfkd().collect());
            }
            "dl" if has_class(&child, "novel_sublist2") => {
                entries.push(parse_entry(child, &part)?);
            }
            _ => {}
        }
    }

    Ok(Some(entries))
}

/// Joins the numbered lines (`id="L…"`) of a text block; blank lines become `\n`
fn block_text(document: &Html, css: &str) -> ExtractResult<Option<String>> {
    let sel = selector(css)?;

    let lines: Vec<String> = document
        .select(&sel)
        .filter(|p| p.value().id().is_some_and(|id| id.starts_with('L')))
        .map(|p| {
            let text = element_text(p);
            if text.is_empty() {
                "\n".to_string()
            } else {
                text
            }
        })
        .collect();

    if lines.is_empty() {
        Ok(None)
    } else {
        Ok(Some(lines.join("\n")))
    }
}

/// Extracts the foreword, body and afterword of a chapter page
pub fn extract_body(html: &str) -> ExtractResult<PageBody> {
    let document = Html::parse_document(html);

    Ok(PageBody {
        pre_content: block_text(&document, "#novel_p p")?,
        content: block_text(&document, "#novel_honbun p")?.unwrap_or_default(),
        post_content: block_text(&document, "#novel_a p")?,
    })
}
