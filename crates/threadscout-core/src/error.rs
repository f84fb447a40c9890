use thiserror::Error;

/// Errors raised while validating operator input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("invalid sort mode '{0}': expected one of relevance, new, hot, top")]
    InvalidSortMode(String),

    #[error("invalid column '{0}': expected one of comment_text, title, text")]
    InvalidColumn(String),

    #[error("at least one search keyword is required")]
    NoKeywords,

    #[error("at least one target column is required")]
    NoColumns,

    #[error("filter expression failed to compile: {0}")]
    Regex(#[from] regex::Error),
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
