//! Conversion from Reddit wire types to threadscout's raw records.

use threadscout_core::{RawComment, RawPost};

use crate::types::{CommentData, SubmissionData};

const SITE_ORIGIN: &str = "https://reddit.com";

/// Absolute permalink for a site-relative Reddit path.
#[must_use]
pub fn full_permalink(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{SITE_ORIGIN}{path}")
    }
}

/// Deleted accounts come back as `[deleted]`; treat them as missing.
fn author_name(author: Option<String>) -> Option<String> {
    author.filter(|a| !a.is_empty() && a != "[deleted]")
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_secs(created_utc: f64) -> i64 {
    created_utc.floor() as i64
}

/// Builds the raw post for one search hit.
#[must_use]
pub fn submission_to_raw(data: SubmissionData, search_word: &str) -> RawPost {
    RawPost {
        search_word: search_word.to_string(),
        subreddit: data.subreddit,
        title: data.title,
        author: author_name(data.author),
        score: data.score.unwrap_or_default(),
        id: data.id,
        url: data.url.unwrap_or_default(),
        permalink: full_permalink(&data.permalink),
        num_comments: data.num_comments.unwrap_or_default(),
        created_utc: epoch_secs(data.created_utc),
        selftext: data.selftext.unwrap_or_default(),
    }
}

/// Builds the raw comment row for a comment under the post at `permalink`.
#[must_use]
pub fn comment_to_raw(data: CommentData, permalink: &str) -> RawComment {
    RawComment {
        permalink: permalink.to_string(),
        author: author_name(data.author),
        score: data.score.unwrap_or_default(),
        id: data.id,
        created_utc: epoch_secs(data.created_utc),
        body: data.body.unwrap_or_default(),
    }
}
