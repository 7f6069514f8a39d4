use super::*;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use github_client::models::{Commit, PullRequest, RepositoryRef};
use github_client::{ActivityClient, GitHubReportConfig};
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex};
use team_status_core::Credentials;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn window() -> ReportingWindow {
    ReportingWindow::resolve(Some("2024-01-10"), None, NaiveDate::MIN).unwrap()
}

fn credentials(server: &str) -> ValidatedCredentials {
    Credentials {
        jira_server: Some(server.to_string()),
        jira_email: Some("ada@example.com".to_string()),
        jira_api_token: Some("jira-token".to_string()),
        github_token: Some("gh-token".to_string()),
    }
    .validate()
    .unwrap()
}

#[test]
fn test_jira_factory_rejects_invalid_server() {
    let temp_dir = TempDir::new().unwrap();
    let factory = DefaultGeneratorFactory::default();

    let err = factory
        .jira(&temp_dir.path().join("jira_config.yaml"), &credentials("not a url"))
        .err()
        .unwrap();

    assert!(format!("{err:#}").starts_with("invalid Jira report settings: Invalid Jira server URL"));
}

#[test]
fn test_github_factory_rejects_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("github_config.yaml");
    fs::write(&config, "repositories: [not-a-repo]\n").unwrap();
    let factory = DefaultGeneratorFactory::default();

    let err = factory
        .github(&config, &credentials("https://jira.example.com"))
        .err()
        .unwrap();

    assert!(format!("{err:#}").starts_with("invalid GitHub report settings"));
}

#[tokio::test]
async fn test_jira_generator_queries_window_range() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("jira_config.yaml");
    fs::write(&config, "title: Core\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param(
            "jql",
            "updated >= \"2024-01-03\" AND updated <= \"2024-01-10 23:59\" ORDER BY updated DESC",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{
                "key": "CORE-1",
                "fields": {
                    "summary": "Ship it",
                    "status": { "name": "Done", "statusCategory": { "key": "done" } }
                }
            }],
            "total": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = DefaultGeneratorFactory::new(JiraAuthMethod::Bearer)
        .jira(&config, &credentials(&mock_server.uri()))
        .unwrap();
    let report = generator.generate(&window()).await.unwrap();

    assert!(report.text.starts_with("## Core\n\n"));
    assert!(report.text.contains("CORE-1"));
    assert_eq!(report.metadata["done"], 1);
}

#[derive(Default)]
struct RecordingActivity {
    since: Mutex<Vec<DateTime<Utc>>>,
}

#[async_trait]
impl ActivityClient for RecordingActivity {
    async fn list_pull_requests(
        &self,
        _repo: &RepositoryRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>, github_client::Error> {
        self.since.lock().unwrap().push(since);
        Ok(Vec::new())
    }

    async fn list_commits(
        &self,
        _repo: &RepositoryRef,
        _since: DateTime<Utc>,
        _until: DateTime<Utc>,
    ) -> Result<Vec<Commit>, github_client::Error> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_github_generator_starts_at_window_end() {
    let client = Arc::new(RecordingActivity::default());
    let summary = WeeklyGitHubSummary::new(
        client.clone(),
        GitHubReportConfig {
            repositories: vec!["octo/api".parse().unwrap()],
            ..GitHubReportConfig::default()
        },
    );

    let report = GitHubReportGenerator::new(summary)
        .generate(&window())
        .await
        .unwrap();

    assert!(report.text.contains("### octo/api"));
    let since = client.since.lock().unwrap().clone();
    assert_eq!(
        since,
        vec![DateTime::parse_from_rfc3339("2024-01-03T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)]
    );
}
