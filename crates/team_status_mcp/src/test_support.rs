//! Test doubles shared by the server's unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jira_client::models::{
    Comment, CreatedIssue, Issue, IssueKey, IssueUpdate, NewIssue, Project, ProjectKey, Status,
    Transition,
};
use jira_client::{Error, IssueTracker, JiraResult};
use serde_json::json;

pub(crate) const SERVER_URL: &str = "https://jira.example.com";

pub(crate) fn issue(
    key: &str,
    summary: &str,
    status: &str,
    assignee: Option<&str>,
    priority: Option<&str>,
) -> Issue {
    serde_json::from_value(json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": { "name": status },
            "assignee": assignee.map(|name| json!({ "displayName": name })),
            "priority": priority.map(|name| json!({ "name": name })),
        }
    }))
    .expect("valid issue payload")
}

/// In-memory tracker that records every call.
#[derive(Default)]
pub(crate) struct MockTracker {
    pub issues: Mutex<HashMap<String, Issue>>,
    pub search_results: Vec<Issue>,
    pub comments: Vec<Comment>,
    pub transitions: Vec<Transition>,
    pub project: Option<Project>,
    /// When set, every call fails with this message.
    pub failure: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockTracker {
    pub fn with_issue(self, issue: Issue) -> Self {
        self.issues
            .lock()
            .unwrap()
            .insert(issue.key.clone(), issue);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> JiraResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(Error::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    fn server_url(&self) -> &str {
        SERVER_URL
    }

    async fn get_issue(&self, key: &IssueKey) -> JiraResult<Issue> {
        self.record(format!("get_issue {key}"))?;
        self.issues
            .lock()
            .unwrap()
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource: format!("Issue {key}"),
            })
    }

    async fn search_issues(&self, jql: &str, max_results: u32) -> JiraResult<Vec<Issue>> {
        self.record(format!("search {jql} | {max_results}"))?;
        Ok(self.search_results.clone())
    }

    async fn create_issue(&self, issue: &NewIssue) -> JiraResult<CreatedIssue> {
        self.record(format!(
            "create {} {} priority={:?} due={:?}",
            issue.project_key, issue.issue_type, issue.priority, issue.due_date
        ))?;
        Ok(CreatedIssue {
            id: "10001".to_string(),
            key: format!("{}-1", issue.project_key),
        })
    }

    async fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> JiraResult<()> {
        self.record(format!(
            "update {key} summary={:?} description={:?}",
            update.summary, update.description
        ))
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> JiraResult<Comment> {
        self.record(format!("comment {key} {body}"))?;
        Ok(Comment {
            id: Some("1".to_string()),
            author: None,
            body: body.to_string(),
            created: None,
        })
    }

    async fn get_comments(&self, key: &IssueKey) -> JiraResult<Vec<Comment>> {
        self.record(format!("comments {key}"))?;
        Ok(self.comments.clone())
    }

    async fn get_transitions(&self, key: &IssueKey) -> JiraResult<Vec<Transition>> {
        self.record(format!("transitions {key}"))?;
        Ok(self.transitions.clone())
    }

    async fn apply_transition(&self, key: &IssueKey, transition_id: &str) -> JiraResult<()> {
        self.record(format!("apply {key} {transition_id}"))?;
        let name = self
            .transitions
            .iter()
            .find(|t| t.id == transition_id)
            .map(|t| t.to.as_ref().map_or(t.name.clone(), |s| s.name.clone()))
            .unwrap_or_default();
        if let Some(issue) = self.issues.lock().unwrap().get_mut(key.as_str()) {
            issue.fields.status = Some(Status {
                name,
                status_category: None,
            });
        }
        Ok(())
    }

    async fn get_project(&self, key: &ProjectKey) -> JiraResult<Project> {
        self.record(format!("project {key}"))?;
        self.project.clone().ok_or_else(|| Error::NotFound {
            resource: format!("Project {key}"),
        })
    }
}
