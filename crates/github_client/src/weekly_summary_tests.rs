use super::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

fn pr(number: u64, author: &str, state: &str, created: &str, updated: &str, merged: Option<&str>) -> PullRequest {
    PullRequest {
        number,
        title: format!("Change {number}"),
        state: state.to_string(),
        user: Some(crate::models::User {
            login: author.to_string(),
        }),
        html_url: None,
        created_at: ts(created),
        updated_at: ts(updated),
        merged_at: merged.map(ts),
        closed_at: merged.map(ts),
        draft: false,
    }
}

fn commit(sha: &str, author: Option<&str>) -> Commit {
    Commit {
        sha: sha.to_string(),
        commit: crate::models::CommitDetails {
            message: format!("Commit {sha}"),
            author: None,
        },
        author: author.map(|login| crate::models::User {
            login: login.to_string(),
        }),
        html_url: None,
    }
}

#[derive(Default)]
struct MockActivityClient {
    pulls: HashMap<String, Vec<PullRequest>>,
    commits: HashMap<String, Vec<Commit>>,
    missing: Vec<String>,
    calls: Mutex<Vec<(String, DateTime<Utc>)>>,
}

#[async_trait]
impl ActivityClient for MockActivityClient {
    async fn list_pull_requests(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>, Error> {
        self.calls.lock().unwrap().push((repo.to_string(), since));
        if self.missing.contains(&repo.to_string()) {
            return Err(Error::NotFound);
        }
        Ok(self.pulls.get(&repo.to_string()).cloned().unwrap_or_default())
    }

    async fn list_commits(
        &self,
        repo: &RepositoryRef,
        _since: DateTime<Utc>,
        _until: DateTime<Utc>,
    ) -> Result<Vec<Commit>, Error> {
        Ok(self.commits.get(&repo.to_string()).cloned().unwrap_or_default())
    }
}

fn config(repos: &[&str], members: &[&str]) -> GitHubReportConfig {
    GitHubReportConfig {
        title: None,
        repositories: repos.iter().map(|r| r.parse().unwrap()).collect(),
        team_members: members.iter().map(|m| m.to_string()).collect(),
    }
}

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn test_load_config_from_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github_config.yaml");
    fs::write(
        &path,
        "title: Platform Team\nrepositories:\n  - octo/api\n  - octo/web\nteam_members: [alice]\n",
    )
    .unwrap();

    let config = GitHubReportConfig::load(&path).unwrap();

    assert_eq!(config.title(), "Platform Team");
    assert_eq!(config.repositories.len(), 2);
    assert_eq!(config.team_members, vec!["alice".to_string()]);
}

#[test]
fn test_load_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let config = GitHubReportConfig::load(&dir.path().join("absent.yaml")).unwrap();

    assert_eq!(config, GitHubReportConfig::default());
    assert_eq!(config.title(), "GitHub Activity");
}

#[test]
fn test_load_rejects_invalid_repository() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github_config.yaml");
    fs::write(&path, "repositories:\n  - not-a-repo\n").unwrap();

    let err = GitHubReportConfig::load(&path).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

#[tokio::test]
async fn test_generate_report_groups_pull_requests() {
    let mut client = MockActivityClient::default();
    client.pulls.insert(
        "octo/api".to_string(),
        vec![
            pr(1, "alice", "closed", "2024-01-04T10:00:00Z", "2024-01-05T10:00:00Z", Some("2024-01-05T10:00:00Z")),
            pr(2, "bob", "open", "2024-01-08T10:00:00Z", "2024-01-08T11:00:00Z", None),
            pr(3, "alice", "open", "2023-12-20T10:00:00Z", "2024-01-09T23:00:00Z", None),
            // Updated after the period ends.
            pr(4, "alice", "open", "2024-01-05T10:00:00Z", "2024-01-10T00:00:01Z", None),
        ],
    );
    client.commits.insert(
        "octo/api".to_string(),
        vec![commit("a1", Some("alice")), commit("b2", None)],
    );
    let client = Arc::new(client);
    let summary = WeeklyGitHubSummary::new(client.clone(), config(&["octo/api"], &[]));

    let (report, metadata) = summary
        .generate_report(day("2024-01-03"), day("2024-01-09"))
        .await
        .unwrap();

    assert!(report.starts_with("## GitHub Activity\n\n"));
    assert!(report.contains(
        "**Repositories:** 1 | **PRs merged:** 1 | **PRs opened:** 1 | **Commits:** 2"
    ));
    assert!(report.contains("### octo/api\n\n"));
    assert!(report.contains("**Merged (1)**\n- #1 Change 1 (@alice)\n"));
    assert!(report.contains("**Opened (1)**\n- #2 Change 2 (@bob)\n"));
    assert!(report.contains("**In review (1)**\n- #3 Change 3 (@alice)\n"));
    assert!(!report.contains("#4"));
    assert!(report.contains("**Commits:** 2"));
    assert_eq!(metadata["prs_in_review"], 1);
    assert_eq!(metadata["commits"], 2);

    let calls = client.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("octo/api".to_string(), ts("2024-01-03T00:00:00Z"))]);
}

#[tokio::test]
async fn test_generate_report_filters_team_members() {
    let mut client = MockActivityClient::default();
    client.pulls.insert(
        "octo/api".to_string(),
        vec![
            pr(1, "Alice", "open", "2024-01-04T10:00:00Z", "2024-01-04T10:00:00Z", None),
            pr(2, "mallory", "open", "2024-01-04T10:00:00Z", "2024-01-04T10:00:00Z", None),
        ],
    );
    client.commits.insert(
        "octo/api".to_string(),
        vec![commit("a1", Some("alice")), commit("m1", Some("mallory")), commit("x", None)],
    );
    let summary = WeeklyGitHubSummary::new(Arc::new(client), config(&["octo/api"], &["alice"]));

    let (report, metadata) = summary
        .generate_report(day("2024-01-03"), day("2024-01-09"))
        .await
        .unwrap();

    assert!(report.contains("#1 Change 1 (@Alice)"));
    assert!(!report.contains("mallory"));
    assert_eq!(metadata["commits"], 1);
}

#[tokio::test]
async fn test_generate_report_isolates_failing_repository() {
    let mut client = MockActivityClient::default();
    client.missing.push("octo/gone".to_string());
    client.commits.insert("octo/api".to_string(), vec![commit("a1", None)]);
    let summary =
        WeeklyGitHubSummary::new(Arc::new(client), config(&["octo/gone", "octo/api"], &[]));

    let (report, metadata) = summary
        .generate_report(day("2024-01-03"), day("2024-01-09"))
        .await
        .unwrap();

    assert!(report.contains("### octo/gone\n\n*Error loading repository: Resource not found*"));
    assert!(report.contains("### octo/api\n\n**Commits:** 1"));
    assert_eq!(metadata["failed_repositories"], json!(["octo/gone"]));
}

#[tokio::test]
async fn test_generate_report_without_repositories() {
    let summary = WeeklyGitHubSummary::new(
        Arc::new(MockActivityClient::default()),
        GitHubReportConfig {
            title: Some("Code".to_string()),
            ..GitHubReportConfig::default()
        },
    );

    let (report, _) = summary
        .generate_report(day("2024-01-03"), day("2024-01-09"))
        .await
        .unwrap();

    assert_eq!(report, "## Code\n\n_No repositories configured._\n");
}

#[tokio::test]
async fn test_generate_report_marks_quiet_repository() {
    let summary = WeeklyGitHubSummary::new(
        Arc::new(MockActivityClient::default()),
        config(&["octo/quiet"], &[]),
    );

    let (report, _) = summary
        .generate_report(day("2024-01-03"), day("2024-01-09"))
        .await
        .unwrap();

    assert!(report.ends_with("### octo/quiet\n\n_No activity in this period._\n"));
}
