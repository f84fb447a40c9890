use threadscout_core::{RawPost, SearchParams};
use threadscout_reddit::{submission_to_raw, RedditClient, RedditError, SearchRequest};

/// Searches each keyword in turn against the same subreddit set and
/// concatenates the hits, tagging each with the keyword that found it.
/// Duplicates across keywords are kept; normalization drops them.
pub(crate) async fn search_all(
    client: &RedditClient,
    params: &SearchParams,
) -> Result<Vec<RawPost>, RedditError> {
    let mut posts = Vec::new();

    for keyword in &params.keywords {
        let request = SearchRequest {
            subreddits: &params.subreddits,
            query: keyword,
            sort: params.sort,
            time_filter: &params.time_filter,
            limit: params.limit,
        };
        let hits = client.search(&request).await?;
        tracing::info!(
            keyword = %keyword,
            subreddits = %params.subreddits,
            hits = hits.len(),
            "keyword search complete"
        );
        posts.extend(hits.into_iter().map(|hit| submission_to_raw(hit, keyword)));
    }

    Ok(posts)
}
