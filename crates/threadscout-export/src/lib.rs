//! Output generators for threadscout: single-sheet xlsx exports, the
//! chronological Markdown report and the SVG word cloud.

pub mod error;
pub mod naming;
pub mod report;
pub mod wordcloud;
pub mod xlsx;

pub use error::ExportError;
pub use naming::{dated_stem, export_file_name, wordcloud_file_name, ExportKind};
pub use report::render_report;
pub use wordcloud::{build_corpus, render_svg, render_wordcloud, word_frequencies, WordWeight};
pub use xlsx::{save_bytes, write_grouped_table, write_table, MERGED_INDEX_COLUMNS};
