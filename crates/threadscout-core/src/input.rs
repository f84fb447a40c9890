//! Parsing of the comma-separated operator inputs.

use chrono::NaiveDate;

use crate::CoreError;

/// Splits a comma-separated input into trimmed, non-empty items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins a comma-separated subreddit list into Reddit's plus-joined form.
/// An empty input selects the aggregate `all` feed.
#[must_use]
pub fn subreddit_set(raw: &str) -> String {
    let names: Vec<String> = split_list(raw)
        .into_iter()
        .map(|name| name.trim_start_matches("r/").to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        "all".to_string()
    } else {
        names.join("+")
    }
}

/// Filename stem derived from the raw query: ASCII punctuation is dropped and
/// spaces become underscores (`"LG Chem, battery"` → `"LG_Chem_battery"`).
#[must_use]
pub fn derive_name_stem(raw_query: &str) -> String {
    raw_query
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] for anything else.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| CoreError::InvalidDate {
        value: raw.to_string(),
    })
}
