//! Unit tests for the github_client crate.

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

fn test_client(mock_server: &MockServer) -> GitHubClient {
    let octocrab = Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .personal_token("test-token".to_string())
        .build()
        .unwrap();
    GitHubClient::new(octocrab)
}

fn pull_json(number: u64, updated_at: &str) -> serde_json::Value {
    json!({
        "number": number,
        "title": format!("PR {number}"),
        "state": "open",
        "user": { "login": "octocat" },
        "html_url": format!("https://github.com/octo/api/pull/{number}"),
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": updated_at,
        "merged_at": null,
        "closed_at": null
    })
}

fn github_error(message: &str) -> serde_json::Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}

#[tokio::test]
async fn test_list_pull_requests_filters_by_updated_time() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/api/pulls"))
        .and(query_param("state", "all"))
        .and(query_param("sort", "updated"))
        .and(query_param("direction", "desc"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            pull_json(3, "2024-01-09T12:00:00Z"),
            pull_json(2, "2024-01-04T12:00:00Z"),
            pull_json(1, "2023-12-30T12:00:00Z"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/api".parse().unwrap();

    let pulls = client
        .list_pull_requests(&repo, ts("2024-01-03T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(
        pulls.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![3, 2]
    );
}

#[tokio::test]
async fn test_list_pull_requests_follows_full_pages() {
    let mock_server = MockServer::start().await;
    let full_page: Vec<_> = (0..100)
        .map(|n| pull_json(1000 - n, "2024-01-08T00:00:00Z"))
        .collect();

    Mock::given(method("GET"))
        .and(path("/repos/octo/api/pulls"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/api/pulls"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([pull_json(1, "2024-01-05T00:00:00Z")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/api".parse().unwrap();

    let pulls = client
        .list_pull_requests(&repo, ts("2024-01-03T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(pulls.len(), 101);
}

#[tokio::test]
async fn test_list_commits_sends_window_bounds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/api/commits"))
        .and(query_param("since", "2024-01-03T00:00:00Z"))
        .and(query_param("until", "2024-01-10T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "sha": "abc123",
                "commit": {
                    "message": "Fix parser",
                    "author": { "name": "Octo", "email": "octo@example.com", "date": "2024-01-05T09:00:00Z" }
                },
                "author": { "login": "octocat" },
                "html_url": "https://github.com/octo/api/commit/abc123"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/api".parse().unwrap();

    let commits = client
        .list_commits(
            &repo,
            ts("2024-01-03T00:00:00Z"),
            ts("2024-01-10T00:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].author_login(), Some("octocat"));
}

#[tokio::test]
async fn test_list_commits_repository_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/missing/commits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(github_error("Not Found")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/missing".parse().unwrap();

    let result = client
        .list_commits(&repo, ts("2024-01-03T00:00:00Z"), ts("2024-01-10T00:00:00Z"))
        .await;

    assert!(matches!(result, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_list_pull_requests_bad_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/api/pulls"))
        .respond_with(ResponseTemplate::new(401).set_body_json(github_error("Bad credentials")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/api".parse().unwrap();

    let result = client
        .list_pull_requests(&repo, ts("2024-01-03T00:00:00Z"))
        .await;

    match result {
        Err(Error::AuthError(message)) => assert_eq!(message, "Bad credentials"),
        other => panic!("Expected AuthError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_pull_requests_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/api/pulls"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(github_error("API rate limit exceeded for user ID 1.")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repo: RepositoryRef = "octo/api".parse().unwrap();

    let result = client
        .list_pull_requests(&repo, ts("2024-01-03T00:00:00Z"))
        .await;

    assert!(matches!(result, Err(Error::RateLimitExceeded)));
}

#[test]
fn test_create_token_client_builds() {
    // Building a client performs no network I/O.
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    assert!(create_token_client("ghp_example").is_ok());
}
