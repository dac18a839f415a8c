//! Parsing helpers for the site's text formats

use crate::extract::{ExtractError, ExtractResult};
use chrono::NaiveDateTime;

/// Date format used on info and impression pages: `2023年 04月01日 12時00分`
pub const SITE_DATETIME_FORMAT: &str = "%Y年 %m月%d日 %H時%M分";

/// Date format used in tables of contents: `2023/04/01 12:00`
pub const TOC_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M";

pub fn parse_site_datetime(field: &'static str, value: &str) -> ExtractResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), SITE_DATETIME_FORMAT).map_err(|_| {
        ExtractError::InvalidField {
            field,
            value: value.to_string(),
        }
    })
}

pub fn parse_toc_datetime(field: &'static str, value: &str) -> ExtractResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TOC_DATETIME_FORMAT).map_err(|_| {
        ExtractError::InvalidField {
            field,
            value: value.to_string(),
        }
    })
}

/// Finds the first `YYYY年 MM月DD日 HH時MM分` timestamp embedded in free text
pub fn find_site_datetime(text: &str) -> Option<NaiveDateTime> {
    text.char_indices()
        .filter(|(_, c)| *c == '年')
        .filter_map(|(idx, _)| {
            let start = idx.checked_sub(4)?;
            let head = text.get(start..)?;
            let end = head.find('分')? + '分'.len_utf8();
            NaiveDateTime::parse_from_str(&head[..end], SITE_DATETIME_FORMAT).ok()
        })
        .next()
}

/// Parses counts such as `1,234件` (first non-empty line, unit stripped)
pub fn parse_count(field: &'static str, value: &str, unit: &str) -> ExtractResult<u32> {
    let line = value
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    line.trim_end_matches(unit)
        .replace(',', "")
        .trim()
        .parse()
        .map_err(|_| ExtractError::InvalidField {
            field,
            value: value.to_string(),
        })
}

/// Parses rating points such as `1,234pt`; anything else (e.g. private ratings) is absent
pub fn parse_points(value: &str) -> Option<i64> {
    value
        .trim()
        .trim_end_matches("pt")
        .replace(',', "")
        .trim()
        .parse()
        .ok()
}

/// Last non-empty path segment of a link: `https://x/y/123/` -> `123`
pub fn last_path_segment(href: &str) -> Option<&str> {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Leading run of ASCII digits in a string, e.g. `12` for `12ページ`
pub fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
