use super::*;

fn test_config(base_url: &str) -> RedditClientConfig {
    RedditClientConfig {
        client_id: "id".to_string(),
        client_secret: "s3cr3t-value".to_string(),
        user_agent: "threadscout-test/0.1".to_string(),
        username: None,
        password: Some("hunter2".to_string()),
        api_base_url: base_url.to_string(),
        auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
        timeout_secs: 30,
    }
}

fn test_client(base_url: &str) -> RedditClient {
    RedditClient::with_token(&test_config(base_url), "token")
        .expect("client construction should not fail")
}

#[test]
fn build_url_joins_path_and_encodes_query() {
    let client = test_client("https://oauth.reddit.com");
    let url = client
        .build_url(
            "r/electricvehicles+batteries/search",
            &[("q", "LG Chem & SK"), ("limit", "100")],
        )
        .unwrap();
    assert_eq!(url.path(), "/r/electricvehicles+batteries/search");
    assert!(
        url.as_str().contains("q=LG+Chem+%26+SK"),
        "query should be form-encoded: {url}"
    );
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("http://localhost:9999/proxy/");
    let url = client.build_url("r/all/search", &[]).unwrap();
    assert_eq!(url.path(), "/proxy/r/all/search");
}

#[test]
fn permalink_path_accepts_absolute_and_relative_forms() {
    assert_eq!(
        permalink_path("https://reddit.com/r/ev/comments/abc/title/").unwrap(),
        "/r/ev/comments/abc/title/"
    );
    assert_eq!(
        permalink_path("/r/ev/comments/abc/title/").unwrap(),
        "/r/ev/comments/abc/title/"
    );
    assert!(matches!(
        permalink_path("not a url"),
        Err(RedditError::InvalidUrl { .. })
    ));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = RedditClient::with_token(&test_config("::nope::"), "token");
    assert!(matches!(result, Err(RedditError::InvalidUrl { .. })));
}

#[test]
fn config_debug_redacts_secrets() {
    let rendered = format!("{:?}", test_config("https://oauth.reddit.com"));
    assert!(!rendered.contains("s3cr3t-value"));
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("[redacted]"));
}

fn rate_headers(remaining: &str, reset: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(RATELIMIT_REMAINING, remaining.parse().unwrap());
    headers.insert(RATELIMIT_RESET, reset.parse().unwrap());
    headers
}

#[test]
fn rate_limit_wait_only_when_window_exhausted() {
    assert_eq!(
        rate_limit_wait(&rate_headers("0.0", "42")),
        Some(Duration::from_secs(42))
    );
    assert_eq!(rate_limit_wait(&rate_headers("598.0", "42")), None);
    assert_eq!(rate_limit_wait(&HeaderMap::new()), None);

    let mut no_reset = HeaderMap::new();
    no_reset.insert(RATELIMIT_REMAINING, "0".parse().unwrap());
    assert_eq!(rate_limit_wait(&no_reset), None);
}
