use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "threadscout/0.1 (keyword-crawler)";
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_CACHE_DIR: &str = "./.threadscout-cache";

/// Load application configuration from environment variables already in the process.
///
/// `.env` files are not read here; the binary loads them once at startup,
/// before argument parsing, so `env`-backed flags see them too.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let reddit_client_id = require("REDDIT_CLIENT_ID")?;
    let reddit_client_secret = require("REDDIT_CLIENT_SECRET")?;
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", DEFAULT_USER_AGENT);

    let reddit_username = optional("REDDIT_USERNAME");
    let reddit_password = optional("REDDIT_PASSWORD");
    match (&reddit_username, &reddit_password) {
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("REDDIT_PASSWORD".to_string())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("REDDIT_USERNAME".to_string())),
        _ => {}
    }

    let reddit_api_base_url = or_default("REDDIT_API_BASE_URL", DEFAULT_API_BASE_URL);
    let reddit_auth_url = or_default("REDDIT_AUTH_URL", DEFAULT_AUTH_URL);

    let log_level = or_default("THREADSCOUT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("THREADSCOUT_REQUEST_TIMEOUT_SECS", "30")?;

    let fetch_concurrency = parse_usize("THREADSCOUT_FETCH_CONCURRENCY", "1")?;
    if fetch_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "THREADSCOUT_FETCH_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let output_dir = PathBuf::from(or_default("THREADSCOUT_OUTPUT_DIR", DEFAULT_OUTPUT_DIR));
    let cache_dir = PathBuf::from(or_default("THREADSCOUT_CACHE_DIR", DEFAULT_CACHE_DIR));

    Ok(AppConfig {
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        reddit_username,
        reddit_password,
        reddit_api_base_url,
        reddit_auth_url,
        log_level,
        request_timeout_secs,
        fetch_concurrency,
        output_dir,
        cache_dir,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
