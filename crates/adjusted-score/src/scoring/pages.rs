//! Page counting for DBLP's free-form `pages` field.
//!
//! Handles comma-separated ranges, `chapter:page` prefixes and roman
//! front-matter numbering. Never fails: bad data degrades to a default.

use std::sync::LazyLock;

use regex::Regex;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid page number regex"));

const ROMAN_NUMERALS: [&str; 15] =
    ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii", "xiv", "xv"];

#[derive(Debug, thiserror::Error)]
enum PageRangeError {
    #[error("page number '{0}' out of range")]
    Overflow(String),
}

/// Count the pages a `pages` field represents.
///
/// Missing or blank input counts as one page. If the string cannot be
/// counted at all the whole field counts as one page.
#[must_use]
pub fn count_pages(page_range: Option<&str>) -> u32 {
    let Some(raw) = page_range.filter(|s| !s.trim().is_empty()) else {
        return 1;
    };

    match try_count_pages(raw) {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(page_range = raw, error = %e, "Could not count pages, assuming 1");
            1
        }
    }
}

fn try_count_pages(raw: &str) -> Result<u32, PageRangeError> {
    let mut total: u32 = 0;

    for segment in raw.split(',').map(str::trim) {
        let Some((start, end)) = endpoints(segment) else {
            total = total.saturating_add(1);
            continue;
        };

        let start = page_number(start)?;
        let end = page_number(end)?;

        if start > end {
            tracing::warn!(segment, page_range = raw, "Invalid page range, skipping segment");
            continue;
        }

        total = (end - start)
            .checked_add(1)
            .and_then(|pages| total.checked_add(pages))
            .ok_or_else(|| PageRangeError::Overflow(segment.to_string()))?;
    }

    Ok(total)
}

/// Split a segment into its start and end tokens. `None` for a single page.
fn endpoints(segment: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = segment.split('-').collect();
    let (left, right) = match *parts.as_slice() {
        [] | [_] => return None,
        // S-1-S-12
        [prefix, start, suffix, end] if is_alphabetic(prefix) && is_alphabetic(suffix) => {
            return Some((start.trim(), end.trim()));
        }
        [left, right, ..] => (left, right),
    };

    let (left, right) = match (left.rsplit_once(':'), right.rsplit_once(':')) {
        // 12:1-12:20
        (Some((_, l)), Some((_, r))) => (l, r),
        // 3: 5-9
        (Some((_, l)), None) => (l, right),
        _ => (left, right),
    };

    Some((first_number_or_raw(left), first_number_or_raw(right)))
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// First run of digits in the token, or the trimmed token if it has none.
fn first_number_or_raw(token: &str) -> &str {
    FIRST_NUMBER.find(token).map_or_else(|| token.trim(), |m| m.as_str())
}

/// Numeric value of a page token. Unknown tokens are page 0.
fn page_number(token: &str) -> Result<u32, PageRangeError> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().map_err(|_| PageRangeError::Overflow(token.to_string()));
    }
    Ok(roman_to_int(token).unwrap_or(0))
}

/// Convert a lowercase-insensitive roman numeral between i and xv.
fn roman_to_int(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    ROMAN_NUMERALS.iter().position(|r| *r == lower).map(|i| i as u32 + 1)
}
