use super::*;
use crate::models::{
    Comment, CreatedIssue, IssueKey, IssueType, IssueUpdate, NewIssue, Project, ProjectKey,
    Transition,
};
use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::TempDir;

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn issue(key: &str, status: &str, category: &str) -> Issue {
    serde_json::from_value(json!({
        "key": key,
        "fields": {
            "summary": format!("Work on {key}"),
            "status": { "name": status, "statusCategory": { "key": category } },
            "assignee": { "displayName": "Ada Lovelace" }
        }
    }))
    .unwrap()
}

/// Search-only tracker that records the JQL it receives.
#[derive(Default)]
struct MockTracker {
    issues: Vec<Issue>,
    fail: bool,
    searches: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl IssueTracker for MockTracker {
    fn server_url(&self) -> &str {
        "https://jira.example.com"
    }

    async fn get_issue(&self, key: &IssueKey) -> JiraResult<Issue> {
        Err(Error::NotFound {
            resource: format!("Issue {key}"),
        })
    }

    async fn search_issues(&self, jql: &str, max_results: u32) -> JiraResult<Vec<Issue>> {
        self.searches
            .lock()
            .unwrap()
            .push((jql.to_string(), max_results));
        if self.fail {
            return Err(Error::Unauthorized("token expired".to_string()));
        }
        Ok(self.issues.clone())
    }

    async fn create_issue(&self, _issue: &NewIssue) -> JiraResult<CreatedIssue> {
        unimplemented!("not used by the weekly summary")
    }

    async fn update_issue(&self, _key: &IssueKey, _update: &IssueUpdate) -> JiraResult<()> {
        unimplemented!("not used by the weekly summary")
    }

    async fn add_comment(&self, _key: &IssueKey, _body: &str) -> JiraResult<Comment> {
        unimplemented!("not used by the weekly summary")
    }

    async fn get_comments(&self, _key: &IssueKey) -> JiraResult<Vec<Comment>> {
        unimplemented!("not used by the weekly summary")
    }

    async fn get_transitions(&self, _key: &IssueKey) -> JiraResult<Vec<Transition>> {
        unimplemented!("not used by the weekly summary")
    }

    async fn apply_transition(&self, _key: &IssueKey, _id: &str) -> JiraResult<()> {
        unimplemented!("not used by the weekly summary")
    }

    async fn get_project(&self, _key: &ProjectKey) -> JiraResult<Project> {
        unimplemented!("not used by the weekly summary")
    }

    async fn get_issue_types(&self, _key: &ProjectKey) -> JiraResult<Vec<IssueType>> {
        unimplemented!("not used by the weekly summary")
    }
}

#[test]
fn test_load_config_from_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jira_config.yaml");
    fs::write(
        &path,
        "title: Core Team\nbase_jql: project = CORE\nteam_emails:\n  - ada@example.com\nmax_results: 50\n",
    )
    .unwrap();

    let config = JiraReportConfig::load(&path).unwrap();

    assert_eq!(config.title(), "Core Team");
    assert_eq!(config.base_jql.as_deref(), Some("project = CORE"));
    assert_eq!(config.team_emails, vec!["ada@example.com".to_string()]);
    assert_eq!(config.max_results, 50);
}

#[test]
fn test_load_missing_or_empty_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("jira_config.yaml");
    fs::write(&empty, "\n").unwrap();

    let missing = JiraReportConfig::load(&dir.path().join("absent.yaml")).unwrap();
    let blank = JiraReportConfig::load(&empty).unwrap();

    assert_eq!(missing, JiraReportConfig::default());
    assert_eq!(blank, JiraReportConfig::default());
    assert_eq!(missing.title(), "Jira Activity");
    assert_eq!(missing.max_results, 200);
}

#[test]
fn test_load_rejects_malformed_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jira_config.yaml");
    fs::write(&path, "max_results: lots\n").unwrap();

    let err = JiraReportConfig::load(&path).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_period_jql_without_base_query() {
    let jql = JiraReportConfig::default().period_jql(day("2024-01-03"), day("2024-01-10"));

    assert_eq!(
        jql,
        "updated >= \"2024-01-03\" AND updated <= \"2024-01-10 23:59\" ORDER BY updated DESC"
    );
}

#[test]
fn test_period_jql_with_base_query_and_team() {
    let config = JiraReportConfig {
        base_jql: Some("project = CORE OR project = WEB".to_string()),
        team_emails: vec!["ada@example.com".to_string(), "grace@example.com".to_string()],
        ..JiraReportConfig::default()
    };

    let jql = config.period_jql(day("2024-01-03"), day("2024-01-10"));

    assert_eq!(
        jql,
        "(project = CORE OR project = WEB) AND updated >= \"2024-01-03\" AND updated <= \"2024-01-10 23:59\" \
         AND assignee in (\"ada@example.com\", \"grace@example.com\") ORDER BY updated DESC"
    );
}

#[tokio::test]
async fn test_generate_report_groups_by_status_category() {
    let tracker = Arc::new(MockTracker {
        issues: vec![
            issue("CORE-1", "Done", "done"),
            issue("CORE-2", "In Review", "indeterminate"),
            issue("CORE-3", "Closed", "done"),
            issue("CORE-4", "Backlog", "new"),
        ],
        ..MockTracker::default()
    });
    let summary = WeeklyJiraSummary::new(tracker.clone(), JiraReportConfig::default());

    let (report, metadata) = summary
        .generate_report(day("2024-01-03"), day("2024-01-10"))
        .await
        .unwrap();

    assert!(report.starts_with("## Jira Activity\n\n"));
    assert!(report.contains(
        "**Issues updated:** 4 | **Completed:** 2 | **In progress:** 1 | **To do:** 1"
    ));
    assert!(report.contains(
        "### Completed (2)\n\n- [CORE-1](https://jira.example.com/browse/CORE-1) Work on CORE-1 (Done, Ada Lovelace)\n"
    ));
    assert!(report.contains("### In progress (1)\n\n"));
    assert!(report.ends_with("(Backlog, Ada Lovelace)\n"));
    assert_eq!(metadata["total"], 4);
    assert_eq!(metadata["done"], 2);
    assert_eq!(metadata["in_progress"], 1);
    assert_eq!(metadata["to_do"], 1);

    let searches = tracker.searches.lock().unwrap().clone();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].1, 200);
}

#[tokio::test]
async fn test_generate_report_without_issues() {
    let summary = WeeklyJiraSummary::new(
        Arc::new(MockTracker::default()),
        JiraReportConfig {
            title: Some("Tickets".to_string()),
            ..JiraReportConfig::default()
        },
    );

    let (report, metadata) = summary
        .generate_report(day("2024-01-03"), day("2024-01-10"))
        .await
        .unwrap();

    assert_eq!(report, "## Tickets\n\n_No issues updated in this period._\n");
    assert_eq!(metadata["total"], 0);
}

#[tokio::test]
async fn test_generate_report_propagates_search_failure() {
    let summary = WeeklyJiraSummary::new(
        Arc::new(MockTracker {
            fail: true,
            ..MockTracker::default()
        }),
        JiraReportConfig::default(),
    );

    let err = summary
        .generate_report(day("2024-01-03"), day("2024-01-10"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Unauthorized(_)));
}
