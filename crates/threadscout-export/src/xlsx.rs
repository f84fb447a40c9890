//! Single-sheet xlsx writer for [`Table`]s.
//!
//! Sheet `Sheet1`, bold header row, no index column. Counts are written as
//! plain numbers and datetimes as Excel serial dates.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use threadscout_core::{Cell, Table};

use crate::error::ExportError;

const SHEET_NAME: &str = "Sheet1";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Excel caps a cell's text at 32,767 characters.
const MAX_CELL_CHARS: usize = 32_767;

/// Index columns of the `all_merged` export, outermost first.
pub const MERGED_INDEX_COLUMNS: &[&str] = &[
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
    "comment_text",
];

struct Formats {
    header: Format,
    datetime: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
        }
    }

    fn merged(&self) -> Self {
        Self {
            header: self.header.clone(),
            datetime: self.datetime.clone().set_align(FormatAlign::Top),
        }
    }
}

/// Writes `table` as a flat sheet and returns the workbook bytes.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] if the workbook cannot be assembled.
pub fn write_table(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    write_header(sheet, &table.columns, &formats)?;
    for (r, row) in table.rows.iter().enumerate() {
        let xl_row = sheet_row(r + 1)?;
        for (c, cell) in row.iter().enumerate() {
            write_cell(sheet, xl_row, sheet_col(c)?, cell, &formats)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Writes `table` with `index_columns` moved to the front as a hierarchical
/// index: within each index column, a run of equal values whose outer index
/// columns are also unchanged becomes one vertically merged cell. Index
/// columns missing from the table are ignored; the remaining columns follow
/// in their original order.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] if the workbook cannot be assembled.
pub fn write_grouped_table(table: &Table, index_columns: &[&str]) -> Result<Vec<u8>, ExportError> {
    let index: Vec<usize> = index_columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    let rest: Vec<usize> = (0..table.columns.len())
        .filter(|i| !index.contains(i))
        .collect();
    let order: Vec<usize> = index.iter().chain(rest.iter()).copied().collect();

    let mut workbook = Workbook::new();
    let formats = Formats::new();
    let merged_formats = formats.merged();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let headers: Vec<&str> = order.iter().map(|&i| table.columns[i]).collect();
    write_header(sheet, &headers, &formats)?;

    for (level, &col) in index.iter().enumerate() {
        let xl_col = sheet_col(level)?;
        for (start, end) in index_runs(table, &index[..=level]) {
            let cell = &table.rows[start][col];
            let first = sheet_row(start + 1)?;
            let last = sheet_row(end + 1)?;
            if start == end || matches!(cell, Cell::Empty) {
                for r in start..=end {
                    write_cell(sheet, sheet_row(r + 1)?, xl_col, cell, &formats)?;
                }
            } else {
                write_merged(sheet, first, last, xl_col, cell, &merged_formats)?;
            }
        }
    }

    for (offset, &col) in rest.iter().enumerate() {
        let xl_col = sheet_col(index.len() + offset)?;
        for (r, row) in table.rows.iter().enumerate() {
            write_cell(sheet, sheet_row(r + 1)?, xl_col, &row[col], &formats)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Writes `bytes` to `dir/file_name`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the directory or file cannot be written.
pub fn save_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output file");
    Ok(path)
}

/// Contiguous row spans `(first, last)` over which every column in `keys`
/// holds the same value.
fn index_runs(table: &Table, keys: &[usize]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for r in 1..=table.rows.len() {
        let continues = r < table.rows.len()
            && keys
                .iter()
                .all(|&k| table.rows[r][k] == table.rows[r - 1][k]);
        if !continues {
            runs.push((start, r - 1));
            start = r;
        }
    }
    runs
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], formats: &Formats) -> Result<(), XlsxError> {
    for (c, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, sheet_col(c)?, *name, &formats.header)?;
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &Formats,
) -> Result<(), XlsxError> {
    match cell {
        Cell::Text(s) => {
            sheet.write_string(row, col, truncate(s))?;
        }
        Cell::Int(n) => {
            sheet.write_number(row, col, int_to_f64(*n))?;
        }
        Cell::DateTime(dt) => {
            sheet.write_number_with_format(row, col, excel_serial(dt), &formats.datetime)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

fn write_merged(
    sheet: &mut Worksheet,
    first: u32,
    last: u32,
    col: u16,
    cell: &Cell,
    formats: &Formats,
) -> Result<(), XlsxError> {
    let align = Format::new().set_align(FormatAlign::Top);
    match cell {
        Cell::Text(s) => {
            sheet.merge_range(first, col, last, col, truncate(s), &align)?;
        }
        Cell::Int(n) => {
            sheet.merge_range(first, col, last, col, "", &align)?;
            sheet.write_number_with_format(first, col, int_to_f64(*n), &align)?;
        }
        Cell::DateTime(dt) => {
            sheet.merge_range(first, col, last, col, "", &formats.datetime)?;
            sheet.write_number_with_format(first, col, excel_serial(dt), &formats.datetime)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[allow(clippy::cast_precision_loss)]
fn int_to_f64(n: i64) -> f64 {
    n as f64
}

/// Days since 1899-12-30, Excel's 1900 date system epoch.
#[allow(clippy::cast_precision_loss)]
fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (*dt - epoch).num_seconds() as f64 / 86_400.0
}

fn sheet_row(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn sheet_col(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        Table {
            columns: vec!["title", "comment_text", "comment_upvotes"],
            rows,
        }
    }

    #[test]
    fn excel_serial_matches_known_dates() {
        let dt = NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!((excel_serial(&dt) - 44_378.5).abs() < 1e-9);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_CELL_CHARS + 5);
        assert_eq!(truncate(&long).chars().count(), MAX_CELL_CHARS);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn index_runs_split_on_outer_level_changes() {
        let t = table(vec![
            vec![Cell::Text("A".into()), Cell::Text("x".into()), Cell::Int(1)],
            vec![Cell::Text("A".into()), Cell::Text("x".into()), Cell::Int(2)],
            vec![Cell::Text("B".into()), Cell::Text("x".into()), Cell::Int(3)],
            vec![Cell::Text("B".into()), Cell::Text("y".into()), Cell::Int(4)],
        ]);

        assert_eq!(index_runs(&t, &[0]), vec![(0, 1), (2, 3)]);
        // "x" spans rows 1-2 but the outer title changes between them.
        assert_eq!(index_runs(&t, &[0, 1]), vec![(0, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn index_runs_of_empty_table_is_empty() {
        assert!(index_runs(&table(Vec::new()), &[0]).is_empty());
    }

    #[test]
    fn writers_produce_xlsx_archives() {
        let t = table(vec![
            vec![Cell::Text("A".into()), Cell::Text("x".into()), Cell::Int(15)],
            vec![Cell::Text("A".into()), Cell::Empty, Cell::Empty],
        ]);
        for bytes in [
            write_table(&t).unwrap(),
            write_grouped_table(&t, &["title", "comment_text"]).unwrap(),
        ] {
            assert_eq!(&bytes[..2], b"PK");
        }
    }
}
