//! Integration tests for `RedditClient` against wiremock.

use threadscout_core::SortMode;
use threadscout_reddit::{
    flatten_forest, CommentNode, RedditClient, RedditClientConfig, RedditError, SearchRequest,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> RedditClientConfig {
    RedditClientConfig {
        client_id: "app-id".to_string(),
        client_secret: "app-secret".to_string(),
        user_agent: "threadscout-test/0.1".to_string(),
        username: None,
        password: None,
        api_base_url: server.uri(),
        auth_url: format!("{}/api/v1/access_token", server.uri()),
        timeout_secs: 30,
    }
}

fn submission(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "t3",
        "data": {
            "id": id,
            "subreddit": "electricvehicles",
            "title": title,
            "author": "poster",
            "score": 10,
            "url": format!("https://reddit.com/r/electricvehicles/comments/{id}/x/"),
            "permalink": format!("/r/electricvehicles/comments/{id}/x/"),
            "num_comments": 2,
            "created_utc": 1_625_140_800.0,
            "selftext": ""
        }
    })
}

fn listing(children: Vec<serde_json::Value>, after: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "kind": "Listing",
        "data": { "after": after, "children": children }
    })
}

fn comment(id: &str, replies: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "kind": "t1",
        "data": {
            "id": id,
            "author": "commenter",
            "score": 1,
            "created_utc": 1_625_141_000.0,
            "body": format!("comment {id}"),
            "replies": replies
        }
    })
}

async fn mount_token(server: &MockServer, grant: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains(format!("grant_type={grant}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": "tok-123", "token_type": "bearer" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_uses_client_credentials_without_account() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    RedditClient::connect(&test_config(&server))
        .await
        .expect("token exchange should succeed");
}

#[tokio::test]
async fn connect_uses_password_grant_with_account() {
    let server = MockServer::start().await;
    mount_token(&server, "password").await;

    let mut config = test_config(&server);
    config.username = Some("me".to_string());
    config.password = Some("pw".to_string());

    RedditClient::connect(&config)
        .await
        .expect("password grant should succeed");
}

#[tokio::test]
async fn connect_reports_rejected_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&server)
        .await;

    let err = RedditClient::connect(&test_config(&server))
        .await
        .err()
        .expect("rejected grant should fail");
    assert!(matches!(err, RedditError::Auth(ref msg) if msg == "invalid_grant"));
}

#[tokio::test]
async fn search_follows_after_cursor_until_exhausted() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    Mock::given(method("GET"))
        .and(path("/r/electricvehicles+batteries/search"))
        .and(query_param("after", "t3_p2"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(vec![submission("p3", "LG recall again")], None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/electricvehicles+batteries/search"))
        .and(query_param("q", "LG Chem battery"))
        .and(query_param("restrict_sr", "on"))
        .and(query_param("sort", "new"))
        .and(query_param("t", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![submission("p1", "LG battery"), submission("p2", "LGES news")],
            Some("t3_p2"),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let results = client
        .search(&SearchRequest {
            subreddits: "electricvehicles+batteries",
            query: "LG Chem battery",
            sort: SortMode::New,
            time_filter: "all",
            limit: None,
        })
        .await
        .expect("search should succeed");

    let ids: Vec<&str> = results.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn exhausted_rate_limit_delays_next_request_until_reset() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("after", "t3_p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(vec![submission("p2", "second page")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "0.0")
                .insert_header("x-ratelimit-reset", "1")
                .set_body_json(listing(vec![submission("p1", "first page")], Some("t3_p1"))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let started = std::time::Instant::now();
    let results = client
        .search(&SearchRequest {
            subreddits: "all",
            query: "LG",
            sort: SortMode::New,
            time_filter: "all",
            limit: None,
        })
        .await
        .expect("search should succeed after waiting");

    assert_eq!(results.len(), 2);
    assert!(
        started.elapsed() >= std::time::Duration::from_secs(1),
        "second page went out after {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn search_stops_at_limit() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![submission("p1", "a"), submission("p2", "b")],
            Some("t3_p2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let results = client
        .search(&SearchRequest {
            subreddits: "all",
            query: "LG",
            sort: SortMode::Relevance,
            time_filter: "all",
            limit: Some(2),
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn comment_forest_reads_second_listing() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    let body = serde_json::json!([
        listing(vec![submission("p1", "LG battery")], None),
        listing(
            vec![
                comment(
                    "c1",
                    listing(
                        vec![
                            comment("c1a", serde_json::json!("")),
                            serde_json::json!({ "kind": "more", "data": { "count": 4, "children": ["q"] } }),
                        ],
                        None,
                    ),
                ),
                comment("c2", serde_json::json!("")),
            ],
            None,
        ),
    ]);

    Mock::given(method("GET"))
        .and(path("/r/electricvehicles/comments/p1/x/"))
        .and(query_param("raw_json", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let forest = client
        .comment_forest("https://reddit.com/r/electricvehicles/comments/p1/x/")
        .await
        .expect("comments should parse");

    assert_eq!(forest.len(), 2);
    assert!(matches!(&forest[0], CommentNode::Comment(c) if c.id == "c1"));

    let ids: Vec<String> = flatten_forest(forest).into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c1", "c2", "c1a"]);
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let err = client
        .search(&SearchRequest {
            subreddits: "all",
            query: "LG",
            sort: SortMode::Relevance,
            time_filter: "all",
            limit: Some(10),
        })
        .await
        .expect_err("429 should fail");

    assert!(matches!(
        err,
        RedditError::RateLimited {
            retry_after_secs: 17
        }
    ));
}

#[tokio::test]
async fn missing_thread_maps_to_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, "client_credentials").await;

    Mock::given(method("GET"))
        .and(path("/r/ev/comments/gone/x/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&test_config(&server)).await.unwrap();
    let err = client
        .comment_forest("/r/ev/comments/gone/x/")
        .await
        .expect_err("404 should fail");

    assert!(matches!(err, RedditError::NotFound { .. }));
}
