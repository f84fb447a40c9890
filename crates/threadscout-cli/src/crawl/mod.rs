//! The `crawl` command: search, normalize, fetch comments, merge, filter and
//! emit the selected outputs.
//!
//! Any API failure or malformed input aborts the run; nothing is retried and
//! partial results are discarded.

mod comments;
mod search;

use anyhow::Context;
use chrono::{Local, Months, NaiveDate, TimeZone};
use clap::{Args, ValueEnum};
use threadscout_core::{
    derive_name_stem, filter_records, merge_posts_and_comments, normalize_comments,
    normalize_posts, parse_date, split_list, subreddit_set, AppConfig, CommentRecord, CoreError,
    DateRange, FilteredRecord, KeywordFilter, MergedRecord, MissingText, PostRecord, SearchParams,
    SortMode, TextColumn, TIME_FILTER_ALL,
};
use threadscout_reddit::{RedditClient, RedditClientConfig, RedditError};

use crate::cache::{ResultCache, Snapshot};
use crate::output;

pub(crate) use comments::fetch_all_comments;
pub(crate) use search::search_all;

/// Which table `--show` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowTable {
    All,
    Posts,
    Comments,
    Filtered,
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Comma-separated subreddits to search; empty searches r/all
    #[arg(long, default_value = "all")]
    pub subreddits: String,

    /// Comma-separated search keywords, each searched separately
    #[arg(long)]
    pub query: String,

    /// Result ordering: relevance, new, hot or top
    #[arg(long, default_value = "relevance")]
    pub sort: SortMode,

    /// First day to keep (YYYY-MM-DD); defaults to one month before today
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day to keep, inclusive (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Maximum number of posts per keyword
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output file stem; derived from the query when omitted
    #[arg(long)]
    pub name: Option<String>,

    /// Comma-separated filter words
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Columns the filter searches: comment_text, title, text
    #[arg(long, value_delimiter = ',', default_value = "comment_text")]
    pub search_in: Vec<TextColumn>,

    /// Print a table to stdout
    #[arg(long, value_enum)]
    pub show: Option<ShowTable>,

    /// Write the xlsx exports to the output directory
    #[arg(long)]
    pub save: bool,

    /// Write an SVG word cloud of the filtered rows
    #[arg(long)]
    pub wordcloud: bool,

    /// Print the chronological report of the filtered rows
    #[arg(long)]
    pub report: bool,

    /// Ignore cached results and query Reddit again
    #[arg(long)]
    pub refresh: bool,

    /// Write missing authors and text as empty cells instead of `None`
    #[arg(long)]
    pub blank_missing: bool,
}

/// Validated inputs of one crawl.
#[derive(Debug)]
pub(crate) struct CrawlPlan {
    pub params: SearchParams,
    pub stem: String,
    pub filter: KeywordFilter,
    pub columns: Vec<TextColumn>,
    pub missing: MissingText,
}

impl CrawlPlan {
    pub(crate) fn from_args(args: &CrawlArgs, today: NaiveDate) -> Result<Self, CoreError> {
        let keywords = split_list(&args.query);
        if keywords.is_empty() {
            return Err(CoreError::NoKeywords);
        }
        if args.search_in.is_empty() {
            return Err(CoreError::NoColumns);
        }

        let start = args
            .start
            .unwrap_or_else(|| today.checked_sub_months(Months::new(1)).unwrap_or(today));
        let end = args.end.unwrap_or(today);
        let range = DateRange::new(start, end)?;

        let stem = args
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| derive_name_stem(&args.query), str::to_string);

        let mut columns: Vec<TextColumn> = Vec::with_capacity(args.search_in.len());
        for column in &args.search_in {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }

        Ok(Self {
            params: SearchParams {
                subreddits: subreddit_set(&args.subreddits),
                keywords,
                sort: args.sort,
                time_filter: TIME_FILTER_ALL.to_string(),
                limit: args.limit,
                range,
            },
            stem,
            filter: KeywordFilter::new(split_list(&args.filter))?,
            columns,
            missing: if args.blank_missing {
                MissingText::Blank
            } else {
                MissingText::Literal
            },
        })
    }
}

/// Every table derived from one snapshot.
#[derive(Debug)]
pub(crate) struct CrawlTables {
    pub posts: Vec<PostRecord>,
    pub comments: Vec<CommentRecord>,
    pub merged: Vec<MergedRecord>,
    pub filtered: Vec<FilteredRecord>,
}

impl CrawlTables {
    pub(crate) fn build<Tz: TimeZone>(snapshot: Snapshot, plan: &CrawlPlan, tz: &Tz) -> Self {
        let posts = normalize_posts(snapshot.posts, &plan.params.range, tz, plan.missing);
        let comments = normalize_comments(snapshot.comments, tz, plan.missing);
        let merged = merge_posts_and_comments(&posts, &comments);
        let filtered = filter_records(&merged, &plan.filter, &plan.columns);
        Self {
            posts,
            comments,
            merged,
            filtered,
        }
    }
}

pub(crate) fn reddit_client_config(config: &AppConfig) -> RedditClientConfig {
    RedditClientConfig {
        client_id: config.reddit_client_id.clone(),
        client_secret: config.reddit_client_secret.clone(),
        user_agent: config.reddit_user_agent.clone(),
        username: config.reddit_username.clone(),
        password: config.reddit_password.clone(),
        api_base_url: config.reddit_api_base_url.clone(),
        auth_url: config.reddit_auth_url.clone(),
        timeout_secs: config.request_timeout_secs,
    }
}

/// Runs every keyword search, then fetches comment threads for the posts that
/// survive normalization in `tz`.
///
/// # Errors
///
/// Returns the first [`RedditError`] raised by any request.
pub(crate) async fn collect_snapshot<Tz: TimeZone>(
    client: &RedditClient,
    params: &SearchParams,
    concurrency: usize,
    tz: &Tz,
) -> Result<Snapshot, RedditError> {
    let posts = search_all(client, params).await?;
    let kept = normalize_posts(posts.clone(), &params.range, tz, MissingText::Literal);
    tracing::info!(posts = kept.len(), "search done");

    let permalinks: Vec<String> = kept.into_iter().map(|post| post.permalink).collect();
    let comments = fetch_all_comments(client, &permalinks, concurrency).await?;
    tracing::info!(comments = comments.len(), "comment crawl done");

    Ok(Snapshot { posts, comments })
}

/// Handler for `threadscout crawl`.
///
/// # Errors
///
/// Returns an error for invalid inputs, any Reddit API failure, or when an
/// output file cannot be written.
pub(crate) async fn run_crawl(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let plan = CrawlPlan::from_args(args, today).context("invalid crawl input")?;
    let cache = ResultCache::new(&config.cache_dir);

    let cached = if args.refresh {
        None
    } else {
        cache.load(&plan.params)?
    };

    let snapshot = if let Some(snapshot) = cached {
        tracing::info!("using cached results; pass --refresh to query Reddit again");
        snapshot
    } else {
        let client = RedditClient::connect(&reddit_client_config(config))
            .await
            .context("failed to authenticate with Reddit")?;
        let snapshot = collect_snapshot(&client, &plan.params, config.fetch_concurrency, &Local)
            .await
            .context("crawl aborted")?;
        cache.store(&plan.params, &snapshot)?;
        snapshot
    };

    let tables = CrawlTables::build(snapshot, &plan, &Local);
    println!(
        "Number of posts: {}, Number of comments: {}",
        tables.posts.len(),
        tables.comments.len()
    );

    if let Some(show) = args.show {
        output::print_table(
            &mut std::io::stdout().lock(),
            &output::select_table(&tables, show),
        )
        .context("failed to write table to stdout")?;
    }

    if args.save {
        let written =
            output::save_exports(&config.output_dir, today, &plan, &tables).context("save failed")?;
        for path in written {
            println!("wrote {}", path.display());
        }
    }

    if args.wordcloud {
        match output::save_wordcloud(&config.output_dir, today, &plan, &tables)? {
            Some(path) => println!("wrote {}", path.display()),
            None => println!("No words in word cloud"),
        }
    }

    if args.report {
        print!(
            "{}",
            threadscout_export::render_report(&tables.filtered, &plan.filter, &plan.columns)
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
