//! Domain types and pure pipeline stages for threadscout.
//!
//! Everything here is free of network and file I/O: the post normalizer,
//! the post/comment merger, the keyword filter, operator-input parsing and
//! the tabular view used by the exporters. The API client lives in
//! `threadscout-reddit`; orchestration lives in the CLI.

pub mod app_config;
pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod merge;
pub mod normalize;
pub mod table;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config_from_env, DEFAULT_CACHE_DIR};
pub use error::{ConfigError, CoreError};
pub use filter::{filter_records, KeywordFilter};
pub use input::{derive_name_stem, parse_date, split_list, subreddit_set};
pub use merge::merge_posts_and_comments;
pub use normalize::{local_datetime, normalize_comments, normalize_posts};
pub use table::{Cell, Table, Tabular};
pub use types::{
    CommentRecord, DateRange, FilteredRecord, MergedRecord, MissingText, PostRecord, RawComment,
    RawPost, SearchParams, SortMode, TextColumn, TIME_FILTER_ALL,
};
