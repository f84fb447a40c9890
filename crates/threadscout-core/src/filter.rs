//! Keyword filter over the merged table.
//!
//! Each filter word becomes `\b<word>\w*\b`: a word-boundary-anchored prefix
//! match, so `LG` matches `LG`, `LGES` and `LGChem` but not `ALGae`. The
//! words are alternated into one case-insensitive expression.

use regex::{Regex, RegexBuilder};

use crate::types::{FilteredRecord, MergedRecord, TextColumn};
use crate::CoreError;

#[derive(Debug, Clone)]
pub struct KeywordFilter {
    words: Vec<String>,
    regex: Option<Regex>,
}

impl KeywordFilter {
    /// Compiles the filter. Blank words are ignored; words are matched
    /// literally, so regex metacharacters such as the `.` in `U.S` carry no
    /// special meaning. An empty word list yields a filter that matches
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Regex`] if the combined expression exceeds the
    /// regex engine's size limits.
    pub fn new<I>(words: I) -> Result<Self, CoreError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            tracing::warn!("filter word list is empty; the filtered table will be empty");
            return Ok(Self { words, regex: None });
        }

        let pattern = build_pattern(&words);
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            words,
            regex: Some(regex),
        })
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// `true` if the text contains a filter word. Missing values never match.
    #[must_use]
    pub fn is_match(&self, text: Option<&str>) -> bool {
        match (&self.regex, text) {
            (Some(re), Some(t)) => re.is_match(t),
            _ => false,
        }
    }

    /// `true` if any of `columns` of the record matches.
    #[must_use]
    pub fn matches_record(&self, record: &MergedRecord, columns: &[TextColumn]) -> bool {
        columns
            .iter()
            .any(|&column| self.is_match(record.text(column)))
    }
}

fn build_pattern(words: &[String]) -> String {
    words
        .iter()
        .map(|w| format!(r"\b{}\w*\b", regex::escape(&w.to_lowercase())))
        .collect::<Vec<_>>()
        .join("|")
}

/// Keeps merged rows where any of `columns` matches, tagging each with its
/// row index in `merged`.
#[must_use]
pub fn filter_records(
    merged: &[MergedRecord],
    filter: &KeywordFilter,
    columns: &[TextColumn],
) -> Vec<FilteredRecord> {
    merged
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches_record(record, columns))
        .map(|(index, record)| FilteredRecord {
            index,
            record: record.clone(),
        })
        .collect()
}
