//! Reddit API client for threadscout.
//!
//! Authenticates with OAuth (client credentials, or the password grant when
//! account credentials are configured), runs paginated subreddit searches and
//! fetches comment forests. Placeholder "load more" nodes are discarded rather
//! than expanded, and the remaining tree is flattened breadth-first.

pub mod client;
pub mod comments;
pub mod convert;
pub mod error;
pub mod types;

pub use client::{RedditClient, RedditClientConfig, SearchRequest};
pub use comments::flatten_forest;
pub use convert::{comment_to_raw, full_permalink, submission_to_raw};
pub use error::RedditError;
pub use types::{CommentData, CommentNode, SubmissionData};
