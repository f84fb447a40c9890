//! Output selection for `crawl`: terminal tables, xlsx files and the word cloud.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use threadscout_core::Table;
use threadscout_export::{
    export_file_name, render_wordcloud, save_bytes, wordcloud_file_name, write_grouped_table,
    write_table, ExportError, ExportKind, MERGED_INDEX_COLUMNS,
};

use crate::crawl::{CrawlPlan, CrawlTables, ShowTable};

pub(crate) fn select_table(tables: &CrawlTables, show: ShowTable) -> Table {
    match show {
        ShowTable::All => Table::from_records(&tables.merged),
        ShowTable::Posts => Table::from_records(&tables.posts),
        ShowTable::Comments => Table::from_records(&tables.comments),
        ShowTable::Filtered => Table::from_records(&tables.filtered),
    }
}

/// Tab-separated rendering, one line per row. Embedded tabs and line breaks
/// are flattened to spaces.
pub(crate) fn render_tsv(table: &Table) -> String {
    let flatten = |s: &str| s.replace(['\t', '\r', '\n'], " ");
    let mut out = table.columns.join("\t");
    out.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|cell| flatten(&cell.display())).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Writes the TSV rendering of `table` to `out`.
///
/// # Errors
///
/// Returns the underlying I/O error, e.g. a closed pipe.
pub(crate) fn print_table<W: Write>(out: &mut W, table: &Table) -> std::io::Result<()> {
    out.write_all(render_tsv(table).as_bytes())?;
    out.flush()
}

/// Writes the five xlsx exports and returns their paths.
///
/// # Errors
///
/// Returns [`ExportError`] if a workbook cannot be built or written.
pub(crate) fn save_exports(
    dir: &Path,
    today: NaiveDate,
    plan: &CrawlPlan,
    tables: &CrawlTables,
) -> Result<Vec<PathBuf>, ExportError> {
    let range = &plan.params.range;
    let merged = Table::from_records(&tables.merged);
    let name = |kind: ExportKind<'_>| export_file_name(today, &plan.stem, range, &kind);

    let files = [
        (
            name(ExportKind::Posts),
            write_table(&Table::from_records(&tables.posts))?,
        ),
        (
            name(ExportKind::Comments),
            write_table(&Table::from_records(&tables.comments))?,
        ),
        (name(ExportKind::All), write_table(&merged)?),
        (
            name(ExportKind::AllMerged),
            write_grouped_table(&merged, MERGED_INDEX_COLUMNS)?,
        ),
        (
            name(ExportKind::Filtered {
                words: plan.filter.words(),
                columns: &plan.columns,
            }),
            write_table(&Table::from_records(&tables.filtered))?,
        ),
    ];

    files
        .iter()
        .map(|(file_name, bytes)| save_bytes(dir, file_name, bytes))
        .collect()
}

/// Writes the word cloud of the filtered rows. Returns `None` when the
/// filtered rows contain no usable words.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the SVG cannot be written.
pub(crate) fn save_wordcloud(
    dir: &Path,
    today: NaiveDate,
    plan: &CrawlPlan,
    tables: &CrawlTables,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(svg) = render_wordcloud(&tables.filtered) else {
        tracing::info!(rows = tables.filtered.len(), "word cloud skipped: empty corpus");
        return Ok(None);
    };
    let file_name = wordcloud_file_name(today, &plan.stem, &plan.params.range);
    save_bytes(dir, &file_name, svg.as_bytes()).map(Some)
}
