//! Chronological Markdown report over the filtered table.

use std::collections::HashSet;
use std::fmt::Write as _;

use threadscout_core::{FilteredRecord, KeywordFilter, TextColumn};

const SHORT_DATE: &str = "%y-%m-%d";

/// Renders the filtered rows as Markdown.
///
/// A post block is emitted whenever a row's post body differs from the
/// previous row's, so consecutive comments under one post share a header.
/// Link posts (empty body) show their url in place of the body. A comment
/// block follows for every row whose comment text matches `filter`.
/// Comment-only rows (no matching post) get no post block.
#[must_use]
pub fn render_report(
    rows: &[FilteredRecord],
    filter: &KeywordFilter,
    columns: &[TextColumn],
) -> String {
    let mut out = String::new();

    if columns == [TextColumn::CommentText].as_slice() {
        let _ = writeln!(out, "Number of comments: {}", rows.len());
    } else {
        let titles: HashSet<&str> = rows
            .iter()
            .filter_map(|r| r.record.post.as_ref())
            .map(|post| post.title.as_str())
            .collect();
        let _ = writeln!(out, "Number of posts: {}", titles.len());
    }

    let mut previous_body: Option<&str> = None;
    for row in rows {
        match &row.record.post {
            None => previous_body = None,
            Some(post) if previous_body != Some(post.text.as_str()) => {
                previous_body = Some(post.text.as_str());
                let _ = writeln!(out, "\n---\n");
                let _ = writeln!(
                    out,
                    "## **ID {}. POST /r/{} | {}**\n",
                    row.index,
                    post.topic,
                    post.created.format(SHORT_DATE)
                );
                let _ = writeln!(out, "### TITLE: {}\n", post.title);
                if post.text.is_empty() {
                    let _ = writeln!(out, "{}", post.url);
                } else {
                    let _ = writeln!(out, "{}", post.text);
                }
            }
            Some(_) => {}
        }

        if let Some(comment) = &row.record.comment {
            if filter.is_match(Some(comment.comment_text.as_str())) {
                let _ = writeln!(
                    out,
                    "\n### ID {}. COMMENT | {}\n",
                    row.index,
                    comment.comment_created.format(SHORT_DATE)
                );
                let _ = writeln!(out, "{}", comment.comment_text);
            }
        }
    }

    out
}
