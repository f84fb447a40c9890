use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Reddit's time-window filter. Searches always cover all time.
pub const TIME_FILTER_ALL: &str = "all";

/// Search ordering accepted by Reddit's search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    New,
    Hot,
    Top,
}

impl SortMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::New => "new",
            SortMode::Hot => "hot",
            SortMode::Top => "top",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "new" => Ok(SortMode::New),
            "hot" => Ok(SortMode::Hot),
            "top" => Ok(SortMode::Top),
            other => Err(CoreError::InvalidSortMode(other.to_string())),
        }
    }
}

/// Text column of the merged table that the keyword filter can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColumn {
    CommentText,
    Title,
    Text,
}

impl TextColumn {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TextColumn::CommentText => "comment_text",
            TextColumn::Title => "title",
            TextColumn::Text => "text",
        }
    }
}

impl fmt::Display for TextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextColumn {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "comment_text" => Ok(TextColumn::CommentText),
            "title" => Ok(TextColumn::Title),
            "text" => Ok(TextColumn::Text),
            other => Err(CoreError::InvalidColumn(other.to_string())),
        }
    }
}

/// How missing text values (deleted authors and the like) are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingText {
    /// Literal `None`, matching the spreadsheets produced by earlier versions.
    #[default]
    Literal,
    /// Empty string.
    Blank,
}

impl MissingText {
    #[must_use]
    pub fn render(self, value: Option<&str>) -> String {
        match (value, self) {
            (Some(v), _) => v.to_string(),
            (None, MissingText::Literal) => "None".to_string(),
            (None, MissingText::Blank) => String::new(),
        }
    }
}

/// Inclusive calendar-date window applied to post creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`CoreError::InvertedDateRange`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Midnight at the start date.
    #[must_use]
    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// 23:59:59 on the end date.
    #[must_use]
    pub fn last_instant(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::seconds(86_399)
    }

    #[must_use]
    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        *at >= self.first_instant() && *at <= self.last_instant()
    }
}

/// One complete search request: every keyword is searched against the same
/// subreddit-set with the same ordering and cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Plus-joined subreddit names, e.g. `batteries+electricvehicles`.
    pub subreddits: String,
    pub keywords: Vec<String>,
    pub sort: SortMode,
    pub time_filter: String,
    /// `None` fetches every page Reddit is willing to return.
    pub limit: Option<usize>,
    pub range: DateRange,
}

/// A submission as returned by one keyword search, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub search_word: String,
    pub subreddit: String,
    pub title: String,
    /// `None` when the account was deleted.
    pub author: Option<String>,
    pub score: i64,
    pub id: String,
    pub url: String,
    /// Absolute permalink (`https://reddit.com/r/...`).
    pub permalink: String,
    pub num_comments: u64,
    pub created_utc: i64,
    pub selftext: String,
}

/// A comment as returned by the comment forest, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    /// Absolute permalink of the parent post.
    pub permalink: String,
    pub author: Option<String>,
    pub score: i64,
    pub id: String,
    pub created_utc: i64,
    pub body: String,
}

/// Row of the posts table.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub search_word: String,
    pub topic: String,
    pub title: String,
    pub username: String,
    pub upvotes: i64,
    pub id: String,
    pub url: String,
    pub permalink: String,
    pub num_comments: u64,
    /// Creation time in the operator's local timezone.
    pub created: NaiveDateTime,
    pub text: String,
}

/// Row of the comments table.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub permalink: String,
    pub comment_username: String,
    pub comment_upvotes: i64,
    pub comment_id: String,
    pub comment_created: NaiveDateTime,
    pub comment_text: String,
}

/// One (post, comment) pairing. `comment` is `None` for posts without
/// comments; `post` is `None` for comments whose permalink matches no post.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub post: Option<PostRecord>,
    pub comment: Option<CommentRecord>,
}

impl MergedRecord {
    /// Value of a filterable text column; `None` when that side of the join
    /// is absent.
    #[must_use]
    pub fn text(&self, column: TextColumn) -> Option<&str> {
        match column {
            TextColumn::CommentText => self.comment.as_ref().map(|c| c.comment_text.as_str()),
            TextColumn::Title => self.post.as_ref().map(|p| p.title.as_str()),
            TextColumn::Text => self.post.as_ref().map(|p| p.text.as_str()),
        }
    }
}

/// A merged row that passed the keyword filter, tagged with its row index in
/// the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRecord {
    pub index: usize,
    pub record: MergedRecord,
}
