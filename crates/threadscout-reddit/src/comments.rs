use std::collections::VecDeque;

use crate::types::{CommentData, CommentNode};

/// Flattens a comment forest breadth-first: all top-level comments, then
/// their replies level by level. "Load more" placeholders are dropped without
/// being expanded.
#[must_use]
pub fn flatten_forest(forest: Vec<CommentNode>) -> Vec<CommentData> {
    let mut queue: VecDeque<CommentNode> = forest.into();
    let mut flat = Vec::new();
    let mut skipped_more = 0usize;

    while let Some(node) = queue.pop_front() {
        match node {
            CommentNode::Comment(mut comment) => {
                queue.extend(std::mem::take(&mut comment.replies));
                flat.push(comment);
            }
            CommentNode::More(_) => skipped_more += 1,
        }
    }

    if skipped_more > 0 {
        tracing::debug!(
            skipped_more,
            comments = flat.len(),
            "dropped load-more placeholders"
        );
    }

    flat
}
