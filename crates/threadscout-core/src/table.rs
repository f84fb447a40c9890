//! Column-ordered tabular view shared by the exporters and the terminal display.

use chrono::NaiveDateTime;

use crate::types::{CommentRecord, FilteredRecord, MergedRecord, PostRecord};

/// One cell of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    DateTime(NaiveDateTime),
    /// No value: the absent side of an outer-joined row.
    Empty,
}

impl Cell {
    /// Plain-text rendering used for terminal output.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// A record type with a fixed column layout.
pub trait Tabular {
    const COLUMNS: &'static [&'static str];

    /// Cells in [`Self::COLUMNS`] order.
    fn cells(&self) -> Vec<Cell>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub fn from_records<T: Tabular>(records: &[T]) -> Self {
        Self {
            columns: T::COLUMNS.to_vec(),
            rows: records.iter().map(Tabular::cells).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }
}

/// Position of `permalink` in [`PostRecord::COLUMNS`].
const PERMALINK_POS: usize = 7;

fn count_cell(n: u64) -> Cell {
    i64::try_from(n).map_or_else(|_| Cell::Text(n.to_string()), Cell::Int)
}

impl Tabular for PostRecord {
    const COLUMNS: &'static [&'static str] = &[
        "search_word",
        "topic",
        "title",
        "username",
        "upvotes",
        "id",
        "url",
        "permalink",
        "num_comments",
        "created",
        "text",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.search_word.clone()),
            Cell::Text(self.topic.clone()),
            Cell::Text(self.title.clone()),
            Cell::Text(self.username.clone()),
            Cell::Int(self.upvotes),
            Cell::Text(self.id.clone()),
            Cell::Text(self.url.clone()),
            Cell::Text(self.permalink.clone()),
            count_cell(self.num_comments),
            Cell::DateTime(self.created),
            Cell::Text(self.text.clone()),
        ]
    }
}

impl Tabular for CommentRecord {
    const COLUMNS: &'static [&'static str] = &[
        "permalink",
        "comment_username",
        "comment_upvotes",
        "comment_id",
        "comment_created",
        "comment_text",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.permalink.clone()),
            Cell::Text(self.comment_username.clone()),
            Cell::Int(self.comment_upvotes),
            Cell::Text(self.comment_id.clone()),
            Cell::DateTime(self.comment_created),
            Cell::Text(self.comment_text.clone()),
        ]
    }
}

impl Tabular for MergedRecord {
    const COLUMNS: &'static [&'static str] = &[
        "search_word",
        "topic",
        "title",
        "username",
        "upvotes",
        "id",
        "url",
        "permalink",
        "num_comments",
        "created",
        "text",
        "comment_username",
        "comment_upvotes",
        "comment_id",
        "comment_created",
        "comment_text",
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = match (&self.post, &self.comment) {
            (Some(post), _) => post.cells(),
            (None, comment) => {
                let mut blank = vec![Cell::Empty; PostRecord::COLUMNS.len()];
                // The join key is kept even when only the comment side exists.
                if let Some(comment) = comment {
                    blank[PERMALINK_POS] = Cell::Text(comment.permalink.clone());
                }
                blank
            }
        };
        match &self.comment {
            Some(comment) => {
                // Skip the comment's permalink: it is the join key already present.
                cells.extend(comment.cells().into_iter().skip(1));
            }
            None => cells.extend(std::iter::repeat(Cell::Empty).take(5)),
        }
        cells
    }
}

impl Tabular for FilteredRecord {
    const COLUMNS: &'static [&'static str] = MergedRecord::COLUMNS;

    fn cells(&self) -> Vec<Cell> {
        self.record.cells()
    }
}
