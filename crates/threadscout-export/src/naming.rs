//! Output file naming.
//!
//! Every file produced by one crawl shares a dated stem:
//! `<today yymmdd>_<stem>_<start yymmdd>-<end yymmdd>`.

use chrono::NaiveDate;
use threadscout_core::{DateRange, TextColumn};

const SHORT_DATE: &str = "%y%m%d";

/// Which table an xlsx export holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind<'a> {
    Posts,
    Comments,
    All,
    AllMerged,
    Filtered {
        words: &'a [String],
        columns: &'a [TextColumn],
    },
}

impl ExportKind<'_> {
    /// File-name suffix for this kind, e.g. `all_merged` or
    /// `filtered_LG+battery_comment_text+title`.
    #[must_use]
    pub fn suffix(&self) -> String {
        match self {
            ExportKind::Posts => "posts".to_string(),
            ExportKind::Comments => "comments".to_string(),
            ExportKind::All => "all".to_string(),
            ExportKind::AllMerged => "all_merged".to_string(),
            ExportKind::Filtered { words, columns } => {
                let columns: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
                format!(
                    "filtered_{}_{}",
                    sanitize(&words.join("+")),
                    columns.join("+")
                )
            }
        }
    }
}

/// Replaces characters that are unsafe in file names.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `stem` is sanitized, so operator-supplied names cannot escape the output
/// directory or name a missing subdirectory.
#[must_use]
pub fn dated_stem(today: NaiveDate, stem: &str, range: &DateRange) -> String {
    format!(
        "{}_{}_{}-{}",
        today.format(SHORT_DATE),
        sanitize(stem),
        range.start.format(SHORT_DATE),
        range.end.format(SHORT_DATE)
    )
}

#[must_use]
pub fn export_file_name(
    today: NaiveDate,
    stem: &str,
    range: &DateRange,
    kind: &ExportKind<'_>,
) -> String {
    format!("{}_{}.xlsx", dated_stem(today, stem, range), kind.suffix())
}

#[must_use]
pub fn wordcloud_file_name(today: NaiveDate, stem: &str, range: &DateRange) -> String {
    format!("{}_wordcloud.svg", dated_stem(today, stem, range))
}
