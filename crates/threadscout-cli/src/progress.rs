//! Terminal progress for the comment crawl.

use indicatif::{ProgressBar, ProgressStyle};

/// Bar over the posts whose comment threads are being fetched. Draws to
/// stderr and stays hidden when stderr is not a terminal.
pub(crate) fn comment_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_message("Crawling comments");
    bar
}
