use std::collections::{HashMap, HashSet};

use crate::types::{CommentRecord, MergedRecord, PostRecord};

/// Joins posts and comments on permalink.
///
/// Full outer join. Every post contributes one row per comment, or a single
/// row with no comment when it has none. Rows follow the post table's order,
/// and each post's comments keep the comment table's order. Comments whose
/// permalink matches no post follow as comment-only rows, in comment order.
#[must_use]
pub fn merge_posts_and_comments(
    posts: &[PostRecord],
    comments: &[CommentRecord],
) -> Vec<MergedRecord> {
    let mut by_permalink: HashMap<&str, Vec<&CommentRecord>> = HashMap::new();
    for comment in comments {
        by_permalink
            .entry(comment.permalink.as_str())
            .or_default()
            .push(comment);
    }

    let mut merged = Vec::with_capacity(posts.len().max(comments.len()));
    for post in posts {
        match by_permalink.get(post.permalink.as_str()) {
            Some(children) => merged.extend(children.iter().map(|comment| MergedRecord {
                post: Some(post.clone()),
                comment: Some((*comment).clone()),
            })),
            None => merged.push(MergedRecord {
                post: Some(post.clone()),
                comment: None,
            }),
        }
    }

    let known: HashSet<&str> = posts.iter().map(|p| p.permalink.as_str()).collect();
    let before = merged.len();
    merged.extend(
        comments
            .iter()
            .filter(|c| !known.contains(c.permalink.as_str()))
            .map(|comment| MergedRecord {
                post: None,
                comment: Some(comment.clone()),
            }),
    );
    let orphans = merged.len() - before;
    if orphans > 0 {
        tracing::debug!(orphans, "comments without a parent post kept as comment-only rows");
    }

    merged
}
