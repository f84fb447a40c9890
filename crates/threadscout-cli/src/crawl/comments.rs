use futures::stream::{self, StreamExt, TryStreamExt};
use threadscout_core::RawComment;
use threadscout_reddit::{comment_to_raw, flatten_forest, RedditClient, RedditError};

use crate::progress;

/// Fetches and flattens the comment thread of every permalink, keeping at
/// most `concurrency` requests in flight. Output follows `permalinks` order
/// regardless of completion order; the first failure aborts the crawl.
pub(crate) async fn fetch_all_comments(
    client: &RedditClient,
    permalinks: &[String],
    concurrency: usize,
) -> Result<Vec<RawComment>, RedditError> {
    let bar = progress::comment_bar(permalinks.len());

    let threads: Result<Vec<Vec<RawComment>>, RedditError> = stream::iter(permalinks)
        .map(|permalink| {
            let bar = bar.clone();
            async move {
                let forest = client.comment_forest(permalink).await?;
                let rows: Vec<RawComment> = flatten_forest(forest)
                    .into_iter()
                    .map(|comment| comment_to_raw(comment, permalink))
                    .collect();
                tracing::debug!(%permalink, comments = rows.len(), "fetched thread");
                bar.inc(1);
                Ok::<_, RedditError>(rows)
            }
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await;

    bar.finish_and_clear();
    Ok(threads?.into_iter().flatten().collect())
}
