//! Serde shapes for the subset of Reddit's listing JSON that threadscout reads.

use serde::{Deserialize, Deserializer};

/// Listing wrapper: `{"kind": "Listing", "data": {"children": [...], "after": ...}}`.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<T>,
    pub after: Option<String>,
}

/// A `t3` child of a search listing.
#[derive(Debug, Deserialize)]
pub struct SubmissionThing {
    pub data: SubmissionData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionData {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub author: Option<String>,
    pub score: Option<i64>,
    /// Outbound link; the post's own permalink for self posts.
    pub url: Option<String>,
    /// Site-relative path, e.g. `/r/rust/comments/abc123/title/`.
    pub permalink: String,
    pub num_comments: Option<u64>,
    pub created_utc: f64,
    pub selftext: Option<String>,
}

/// Node of a comment forest: a comment, or a "load more comments" placeholder.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentNode {
    #[serde(rename = "t1")]
    Comment(CommentData),
    #[serde(rename = "more")]
    More(MoreData),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub created_utc: f64,
    pub body: Option<String>,
    /// Reddit sends `""` for a comment without replies and a listing otherwise.
    #[serde(default, deserialize_with = "deserialize_replies")]
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreData {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Token endpoint response. A rejected password grant comes back as HTTP 200
/// with `error` set and no token.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: Option<String>,
    pub(crate) error: Option<String>,
}

fn deserialize_replies<'de, D>(deserializer: D) -> Result<Vec<CommentNode>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Replies {
        Listing(Listing<CommentNode>),
        Empty(serde::de::IgnoredAny),
    }

    Ok(match Replies::deserialize(deserializer)? {
        Replies::Listing(listing) => listing.data.children,
        Replies::Empty(_) => Vec::new(),
    })
}
