use std::path::PathBuf;

/// Runtime configuration resolved from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub reddit_username: Option<String>,
    pub reddit_password: Option<String>,
    pub reddit_api_base_url: String,
    pub reddit_auth_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub fetch_concurrency: usize,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"[redacted]")
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("reddit_username", &self.reddit_username)
            .field(
                "reddit_password",
                &self.reddit_password.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_api_base_url", &self.reddit_api_base_url)
            .field("reddit_auth_url", &self.reddit_auth_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("output_dir", &self.output_dir)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}
