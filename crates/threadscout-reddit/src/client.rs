//! HTTP client for the Reddit OAuth API.
//!
//! Wraps `reqwest` with bearer-token authentication, listing pagination and a
//! status-code mapping onto [`RedditError`]. Nothing here retries; when a
//! response reports an exhausted rate-limit window, the next request waits for
//! the announced reset.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode, Url};
use threadscout_core::SortMode;
use tokio::sync::Mutex;

use crate::error::RedditError;
use crate::types::{CommentNode, Listing, SubmissionData, SubmissionThing, TokenResponse};

/// Reddit caps listing pages at 100 children.
const PAGE_LIMIT: usize = 100;

/// Upper bound on search pages per request. Reddit stops returning cursors
/// around the 1000th result, so this is only hit by a misbehaving server.
const MAX_SEARCH_PAGES: usize = 50;

/// Mirrors the depth-first comment cap of the official wrappers.
const COMMENT_LIMIT: &str = "2048";

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Connection settings for [`RedditClient::connect`].
#[derive(Clone)]
pub struct RedditClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    /// Account credentials. When both are present the password grant is used,
    /// otherwise the app authenticates with client credentials only.
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_base_url: String,
    pub auth_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for RedditClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("api_base_url", &self.api_base_url)
            .field("auth_url", &self.auth_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// One subreddit search: `query` restricted to `subreddits` (a `+`-joined set).
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub subreddits: &'a str,
    pub query: &'a str,
    pub sort: SortMode,
    pub time_filter: &'a str,
    /// Maximum number of submissions to return; `None` pages until exhausted.
    pub limit: Option<usize>,
}

/// Authenticated client for `oauth.reddit.com`.
pub struct RedditClient {
    client: Client,
    token: String,
    base_url: Url,
    /// Earliest instant the next request may go out. Set when a response
    /// reports zero remaining requests in the current window.
    resume_at: Mutex<Option<Instant>>,
}

impl RedditClient {
    /// Exchanges the configured credentials for a bearer token and returns a
    /// ready client.
    ///
    /// # Errors
    ///
    /// - [`RedditError::Auth`] if the token endpoint rejects the credentials.
    /// - [`RedditError::InvalidUrl`] if either configured URL does not parse.
    /// - [`RedditError::Http`] on network failure.
    pub async fn connect(config: &RedditClientConfig) -> Result<Self, RedditError> {
        let client = build_http_client(config)?;
        let auth_url = Url::parse(&config.auth_url).map_err(|e| RedditError::InvalidUrl {
            url: config.auth_url.clone(),
            reason: e.to_string(),
        })?;

        let token = fetch_token(&client, auth_url, config).await?;
        tracing::debug!(
            grant = if config.username.is_some() { "password" } else { "client_credentials" },
            "obtained Reddit access token"
        );

        Ok(Self {
            client,
            token,
            base_url: parse_base_url(&config.api_base_url)?,
            resume_at: Mutex::new(None),
        })
    }

    /// Builds a client around an already-issued bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::InvalidUrl`] if `api_base_url` does not parse, or
    /// [`RedditError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn with_token(config: &RedditClientConfig, token: &str) -> Result<Self, RedditError> {
        Ok(Self {
            client: build_http_client(config)?,
            token: token.to_owned(),
            base_url: parse_base_url(&config.api_base_url)?,
            resume_at: Mutex::new(None),
        })
    }

    /// Runs a subreddit search, following `after` cursors until `limit`
    /// submissions have been collected or the listing is exhausted.
    ///
    /// # Errors
    ///
    /// - [`RedditError::Auth`], [`RedditError::NotFound`],
    ///   [`RedditError::RateLimited`] or [`RedditError::UnexpectedStatus`] for
    ///   non-2xx responses.
    /// - [`RedditError::Deserialize`] if a page is not a submission listing.
    pub async fn search(
        &self,
        request: &SearchRequest<'_>,
    ) -> Result<Vec<SubmissionData>, RedditError> {
        let path = format!("r/{}/search", request.subreddits);
        let mut submissions: Vec<SubmissionData> = Vec::new();
        let mut after: Option<String> = None;

        for page in 0..MAX_SEARCH_PAGES {
            let page_size = match request.limit {
                Some(limit) => limit.saturating_sub(submissions.len()).min(PAGE_LIMIT),
                None => PAGE_LIMIT,
            };
            if page_size == 0 {
                break;
            }

            let page_size = page_size.to_string();
            let mut params = vec![
                ("q", request.query),
                ("restrict_sr", "on"),
                ("sort", request.sort.as_str()),
                ("t", request.time_filter),
                ("limit", page_size.as_str()),
                ("syntax", "lucene"),
                ("raw_json", "1"),
            ];
            if let Some(cursor) = after.as_deref() {
                params.push(("after", cursor));
            }

            let url = self.build_url(&path, &params)?;
            let body = self.request_json(url).await?;
            let listing: Listing<SubmissionThing> =
                serde_json::from_value(body).map_err(|e| RedditError::Deserialize {
                    context: format!("search(q={}, page={page})", request.query),
                    source: e,
                })?;

            let received = listing.data.children.len();
            submissions.extend(listing.data.children.into_iter().map(|thing| thing.data));
            tracing::debug!(page, received, total = submissions.len(), "search page");

            after = listing.data.after;
            if after.is_none() || received == 0 {
                break;
            }
            if page + 1 == MAX_SEARCH_PAGES {
                tracing::warn!(
                    query = request.query,
                    pages = MAX_SEARCH_PAGES,
                    "search pagination cap reached; results truncated"
                );
            }
        }

        if let Some(limit) = request.limit {
            submissions.truncate(limit);
        }
        Ok(submissions)
    }

    /// Fetches the comment forest of the submission at `permalink`. Accepts
    /// either an absolute `https://reddit.com/...` link or a site-relative path.
    ///
    /// # Errors
    ///
    /// - [`RedditError::InvalidUrl`] if the permalink cannot be resolved.
    /// - Status-mapped errors as for [`RedditClient::search`].
    /// - [`RedditError::Deserialize`] if the body is not the
    ///   `[submission, comments]` listing pair.
    pub async fn comment_forest(&self, permalink: &str) -> Result<Vec<CommentNode>, RedditError> {
        let path = permalink_path(permalink)?;
        let url = self.build_url(
            path.trim_start_matches('/'),
            &[
                ("limit", COMMENT_LIMIT),
                ("sort", "confidence"),
                ("raw_json", "1"),
            ],
        )?;

        let body = self.request_json(url).await?;
        let comments = match body {
            serde_json::Value::Array(parts) => parts.into_iter().nth(1),
            _ => None,
        }
        .unwrap_or(serde_json::Value::Null);

        let listing: Listing<CommentNode> =
            serde_json::from_value(comments).map_err(|e| RedditError::Deserialize {
                context: format!("comments({permalink})"),
                source: e,
            })?;

        Ok(listing.data.children)
    }

    /// Resolves `path` against the API base and appends the query pairs.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, RedditError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| RedditError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: Url) -> Result<serde_json::Value, RedditError> {
        let context = url.to_string();
        self.wait_for_request_slot().await;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        self.record_rate_limit(response.headers()).await;
        let response = check_status(response)?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RedditError::Deserialize { context, source: e })
    }

    /// Holds the request back until an exhausted rate-limit window has reset.
    /// The lock is kept while sleeping so concurrent fetches queue behind it.
    async fn wait_for_request_slot(&self) {
        let mut resume_at = self.resume_at.lock().await;
        if let Some(at) = resume_at.take() {
            let wait = at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                tracing::info!(
                    wait_secs = wait.as_secs_f64(),
                    "Reddit rate limit exhausted; waiting for reset"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }

    async fn record_rate_limit(&self, headers: &HeaderMap) {
        if let Some(wait) = rate_limit_wait(headers) {
            *self.resume_at.lock().await = Some(Instant::now() + wait);
        }
    }
}

/// Reads Reddit's rate-limit headers. Returns the time until the window resets
/// when no requests remain in it, `None` otherwise or when the headers are absent.
fn rate_limit_wait(headers: &HeaderMap) -> Option<Duration> {
    let header_f64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let remaining = header_f64(RATELIMIT_REMAINING)?;
    if remaining >= 1.0 {
        return None;
    }
    let reset = header_f64(RATELIMIT_RESET)?;
    Some(Duration::from_secs_f64(reset.max(0.0)))
}

fn build_http_client(config: &RedditClientConfig) -> Result<Client, RedditError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(config.user_agent.as_str())
        .build()?)
}

/// Ensures exactly one trailing slash so relative joins append to the base path.
fn parse_base_url(base_url: &str) -> Result<Url, RedditError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| RedditError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

fn permalink_path(permalink: &str) -> Result<String, RedditError> {
    if permalink.starts_with('/') {
        return Ok(permalink.to_owned());
    }
    Url::parse(permalink)
        .map(|u| u.path().to_owned())
        .map_err(|e| RedditError::InvalidUrl {
            url: permalink.to_owned(),
            reason: e.to_string(),
        })
}

async fn fetch_token(
    client: &Client,
    auth_url: Url,
    config: &RedditClientConfig,
) -> Result<String, RedditError> {
    let form: Vec<(&str, &str)> = match (config.username.as_deref(), config.password.as_deref()) {
        (Some(username), Some(password)) => vec![
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ],
        _ => vec![("grant_type", "client_credentials")],
    };

    let response = client
        .post(auth_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&form)
        .send()
        .await?;
    let response = check_status(response)?;
    let body = response.text().await?;
    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
            context: "access_token".to_string(),
            source: e,
        })?;

    match token.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(access_token),
        _ => Err(RedditError::Auth(
            token
                .error
                .unwrap_or_else(|| "token response carried no access_token".to_string()),
        )),
    }
}

/// Maps non-2xx responses onto [`RedditError`] variants.
fn check_status(response: Response) -> Result<Response, RedditError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RedditError::Auth(format!("{status} from {url}"))
        }
        StatusCode::NOT_FOUND => RedditError::NotFound { url },
        StatusCode::TOO_MANY_REQUESTS => RedditError::RateLimited {
            retry_after_secs: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        other => RedditError::UnexpectedStatus {
            status: other.as_u16(),
            url,
        },
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
