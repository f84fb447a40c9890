//! Normalization from raw API records to the uniform post and comment tables.
//!
//! Posts are deduplicated on `(id, permalink)` keeping the first occurrence,
//! then restricted to the inclusive date range. Epoch timestamps become local
//! calendar time in the supplied timezone, and missing text is rendered
//! according to [`MissingText`].

use std::collections::HashSet;

use chrono::{NaiveDateTime, TimeZone};

use crate::types::{CommentRecord, DateRange, MissingText, PostRecord, RawComment, RawPost};

/// Converts a Unix timestamp to wall-clock time in `tz`.
///
/// Out-of-range timestamps collapse to the Unix epoch.
pub fn local_datetime<Tz: TimeZone>(tz: &Tz, epoch_secs: i64) -> NaiveDateTime {
    tz.timestamp_opt(epoch_secs, 0)
        .earliest()
        .map(|dt| dt.naive_local())
        .unwrap_or_default()
}

/// Builds the posts table from concatenated search results.
pub fn normalize_posts<Tz: TimeZone>(
    raw: Vec<RawPost>,
    range: &DateRange,
    tz: &Tz,
    missing: MissingText,
) -> Vec<PostRecord> {
    let total = raw.len();
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(total);
    let mut duplicates = 0usize;

    let posts: Vec<PostRecord> = raw
        .into_iter()
        .filter(|post| {
            let fresh = seen.insert((post.id.clone(), post.permalink.clone()));
            if !fresh {
                duplicates += 1;
            }
            fresh
        })
        .map(|post| PostRecord {
            created: local_datetime(tz, post.created_utc),
            search_word: post.search_word,
            topic: post.subreddit,
            title: post.title,
            username: missing.render(post.author.as_deref()),
            upvotes: post.score,
            id: post.id,
            url: post.url,
            permalink: post.permalink,
            num_comments: post.num_comments,
            text: post.selftext,
        })
        .filter(|post| range.contains(&post.created))
        .collect();

    tracing::debug!(
        total,
        duplicates,
        kept = posts.len(),
        start = %range.start,
        end = %range.end,
        "normalized posts"
    );

    posts
}

/// Builds the comments table from flattened comment forests.
pub fn normalize_comments<Tz: TimeZone>(
    raw: Vec<RawComment>,
    tz: &Tz,
    missing: MissingText,
) -> Vec<CommentRecord> {
    raw.into_iter()
        .map(|comment| CommentRecord {
            comment_created: local_datetime(tz, comment.created_utc),
            permalink: comment.permalink,
            comment_username: missing.render(comment.author.as_deref()),
            comment_upvotes: comment.score,
            comment_id: comment.id,
            comment_text: comment.body,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, Utc};

    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        )
        .unwrap()
    }

    fn epoch(s: &str) -> i64 {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn raw_post(id: &str, created: &str) -> RawPost {
        RawPost {
            search_word: "battery".to_string(),
            subreddit: "electricvehicles".to_string(),
            title: format!("post {id}"),
            author: Some("alice".to_string()),
            score: 1,
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
            permalink: format!("https://reddit.com/r/electricvehicles/comments/{id}/"),
            num_comments: 0,
            created_utc: epoch(created),
            selftext: String::new(),
        }
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut second_search = raw_post("a1", "2021-07-01 10:00:00");
        second_search.search_word = "LG Chem battery".to_string();
        let raw = vec![
            raw_post("a1", "2021-07-01 10:00:00"),
            raw_post("b2", "2021-07-02 10:00:00"),
            second_search,
            raw_post("b2", "2021-07-02 10:00:00"),
        ];

        let posts = normalize_posts(
            raw,
            &range("2021-06-23", "2021-07-23"),
            &Utc,
            MissingText::Literal,
        );

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "a1");
        assert_eq!(posts[0].search_word, "battery");
        assert_eq!(posts[1].id, "b2");
    }

    #[test]
    fn same_id_with_different_permalink_is_kept() {
        let mut other = raw_post("a1", "2021-07-01 10:00:00");
        other.permalink = "https://reddit.com/r/other/comments/a1/".to_string();
        let raw = vec![raw_post("a1", "2021-07-01 10:00:00"), other];

        let posts = normalize_posts(
            raw,
            &range("2021-06-23", "2021-07-23"),
            &Utc,
            MissingText::Literal,
        );
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn date_filter_is_inclusive_on_both_ends() {
        let raw = vec![
            raw_post("early", "2021-06-22 23:59:59"),
            raw_post("first", "2021-06-23 00:00:00"),
            raw_post("last", "2021-07-23 23:59:59"),
            raw_post("late", "2021-07-24 00:00:00"),
        ];
        let window = range("2021-06-23", "2021-07-23");

        let posts = normalize_posts(raw, &window, &Utc, MissingText::Literal);

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "last"]);
        assert!(posts
            .iter()
            .all(|p| p.created >= window.first_instant() && p.created <= window.last_instant()));
    }

    #[test]
    fn created_is_converted_to_the_given_timezone() {
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        // 20:00 UTC on the 23rd is already the 24th in Seoul.
        let raw = vec![raw_post("tz", "2021-07-23 20:00:00")];

        let in_utc = normalize_posts(
            raw.clone(),
            &range("2021-07-23", "2021-07-23"),
            &Utc,
            MissingText::Literal,
        );
        let in_seoul = normalize_posts(
            raw,
            &range("2021-07-23", "2021-07-23"),
            &seoul,
            MissingText::Literal,
        );

        assert_eq!(in_utc.len(), 1);
        assert!(in_seoul.is_empty());
    }

    #[test]
    fn deleted_author_becomes_literal_none() {
        let mut post = raw_post("gone", "2021-07-01 10:00:00");
        post.author = None;

        let posts = normalize_posts(
            vec![post.clone()],
            &range("2021-06-23", "2021-07-23"),
            &Utc,
            MissingText::Literal,
        );
        assert_eq!(posts[0].username, "None");

        let blank = normalize_posts(
            vec![post],
            &range("2021-06-23", "2021-07-23"),
            &Utc,
            MissingText::Blank,
        );
        assert_eq!(blank[0].username, "");
    }

    #[test]
    fn comments_keep_order_and_parent_permalink() {
        let raw = vec![
            RawComment {
                permalink: "https://reddit.com/r/ev/comments/a1/".to_string(),
                author: Some("bob".to_string()),
                score: 4,
                id: "c1".to_string(),
                created_utc: epoch("2021-07-01 11:00:00"),
                body: "LGES announced a new plant".to_string(),
            },
            RawComment {
                permalink: "https://reddit.com/r/ev/comments/a1/".to_string(),
                author: None,
                score: -2,
                id: "c2".to_string(),
                created_utc: epoch("2021-07-01 12:00:00"),
                body: "[deleted]".to_string(),
            },
        ];

        let comments = normalize_comments(raw, &Utc, MissingText::Literal);

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment_id, "c1");
        assert_eq!(comments[1].comment_username, "None");
        assert_eq!(
            comments[0].comment_created,
            NaiveDateTime::parse_from_str("2021-07-01 11:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }
}
