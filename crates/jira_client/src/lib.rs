//! Crate for interacting with the Jira REST API.
//!
//! Provides [`JiraClient`], a small reqwest-based client for the version 2
//! REST API covering issues, comments, transitions, projects and JQL search,
//! and the generator for the Jira section of the weekly status report.
//!
//! The operations are exposed through the [`IssueTracker`] trait so callers
//! can substitute a test double.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::{Error, JiraResult};

pub mod models;
use models::{
    Comment, CommentPage, CreatedIssue, Issue, IssueKey, IssueType, IssueUpdate, NewIssue,
    Project, ProjectKey, SearchResults, Transition, TransitionList, TransitionOutcome,
};

pub mod weekly_summary;
pub use weekly_summary::{JiraReportConfig, WeeklyJiraSummary};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// JQL used for the issues assigned to the authenticated user.
pub const MY_ISSUES_JQL: &str = "assignee = currentUser() ORDER BY updated DESC";

/// Largest page Jira returns for a single search request.
const SEARCH_PAGE_SIZE: u32 = 100;

/// Fields requested for search results.
const SEARCH_FIELDS: &str =
    "summary,status,priority,assignee,reporter,created,updated,resolutiondate,issuetype,project";

/// How requests authenticate against Jira.
#[derive(Clone)]
pub enum JiraAuth {
    /// Personal access token sent as `Authorization: Bearer <token>`.
    Bearer(String),
    /// Account email and API token sent as HTTP basic auth.
    Basic { email: String, api_token: String },
}

impl fmt::Debug for JiraAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JiraAuth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            JiraAuth::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("api_token", &"<redacted>")
                .finish(),
        }
    }
}

/// Jira issue operations.
///
/// Implementors provide the primitive REST calls. Transition lookup, issue
/// types and the canned searches are built on top of them.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Base URL of the Jira server, without a trailing slash.
    fn server_url(&self) -> &str;

    async fn get_issue(&self, key: &IssueKey) -> JiraResult<Issue>;

    /// Run a JQL query, returning at most `max_results` issues.
    async fn search_issues(&self, jql: &str, max_results: u32) -> JiraResult<Vec<Issue>>;

    async fn create_issue(&self, issue: &NewIssue) -> JiraResult<CreatedIssue>;

    /// Apply `update`. Callers are expected to skip empty updates.
    async fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> JiraResult<()>;

    async fn add_comment(&self, key: &IssueKey, body: &str) -> JiraResult<Comment>;

    async fn get_comments(&self, key: &IssueKey) -> JiraResult<Vec<Comment>>;

    async fn get_transitions(&self, key: &IssueKey) -> JiraResult<Vec<Transition>>;

    async fn apply_transition(&self, key: &IssueKey, transition_id: &str) -> JiraResult<()>;

    async fn get_project(&self, key: &ProjectKey) -> JiraResult<Project>;

    /// Move an issue through the transition whose name matches
    /// `transition_name`, ignoring case.
    ///
    /// Returns `TransitionOutcome::NotAvailable` with every transition name
    /// when nothing matches.
    async fn transition_issue(
        &self,
        key: &IssueKey,
        transition_name: &str,
    ) -> JiraResult<TransitionOutcome> {
        let transitions = self.get_transitions(key).await?;

        let Some(transition) = transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(transition_name.trim()))
        else {
            return Ok(TransitionOutcome::NotAvailable {
                available: transitions.into_iter().map(|t| t.name).collect(),
            });
        };

        self.apply_transition(key, &transition.id).await?;
        let issue = self.get_issue(key).await?;

        Ok(TransitionOutcome::Applied {
            new_status: issue.status_name().to_string(),
        })
    }

    async fn get_issue_types(&self, key: &ProjectKey) -> JiraResult<Vec<IssueType>> {
        Ok(self.get_project(key).await?.issue_types)
    }

    async fn get_my_issues(&self, max_results: u32) -> JiraResult<Vec<Issue>> {
        self.search_issues(MY_ISSUES_JQL, max_results).await
    }

    async fn get_project_issues(
        &self,
        key: &ProjectKey,
        max_results: u32,
    ) -> JiraResult<Vec<Issue>> {
        let jql = format!("project = {key} ORDER BY updated DESC");
        self.search_issues(&jql, max_results).await
    }

    /// Web URL of an issue.
    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.server_url(), key)
    }

    /// Web URL of a project.
    fn project_url(&self, key: &str) -> String {
        format!("{}/projects/{}", self.server_url(), key)
    }
}

/// Error document returned by Jira for failed requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JiraErrorBody {
    error_messages: Vec<String>,
    errors: serde_json::Map<String, serde_json::Value>,
}

/// A client for the Jira REST API version 2.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    server_url: String,
    auth: JiraAuth,
}

impl JiraClient {
    /// Creates a client for the Jira instance at `server`.
    ///
    /// `server` may include a context path, e.g. `https://example.com/jira`.
    ///
    /// # Errors
    /// Returns `Error::InvalidServerUrl` if `server` is not an absolute http(s) URL.
    pub fn new(server: &str, auth: JiraAuth) -> JiraResult<Self> {
        let invalid = |reason: &str| Error::InvalidServerUrl {
            url: server.to_string(),
            reason: reason.to_string(),
        };

        let server_url = server.trim().trim_end_matches('/').to_string();
        let base_url =
            Url::parse(&format!("{server_url}/")).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("team_status/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(server = %server_url, "Created Jira client");
        Ok(Self {
            http,
            base_url,
            server_url,
            auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> JiraResult<RequestBuilder> {
        let url = self
            .base_url
            .join(&format!("rest/api/2/{path}"))
            .map_err(|e| Error::InvalidServerUrl {
                url: self.server_url.clone(),
                reason: e.to_string(),
            })?;

        let builder = self.http.request(method, url).header("Accept", "application/json");
        Ok(match &self.auth {
            JiraAuth::Bearer(token) => builder.bearer_auth(token),
            JiraAuth::Basic { email, api_token } => builder.basic_auth(email, Some(api_token)),
        })
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        resource: &str,
    ) -> JiraResult<T> {
        let body = self.send(builder, resource).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, builder: RequestBuilder, resource: &str) -> JiraResult<String> {
        let response = builder.send().await.map_err(|e| {
            error!(resource = resource, error = %e, "Request to Jira failed");
            Error::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!(resource = resource, status = status.as_u16(), "Jira request succeeded");
            return Ok(body);
        }

        let message = error_message(status, &body);
        error!(
            resource = resource,
            status = status.as_u16(),
            error_message = %message,
            "Jira returned an error"
        );

        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<JiraErrorBody> = serde_json::from_str(body).ok();
    let mut messages = Vec::new();

    if let Some(parsed) = parsed {
        messages.extend(parsed.error_messages);
        messages.extend(parsed.errors.into_iter().map(|(field, value)| match value {
            serde_json::Value::String(text) => format!("{field}: {text}"),
            other => format!("{field}: {other}"),
        }));
    }

    if messages.is_empty() {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return status.to_string();
        }
        return trimmed.to_string();
    }

    messages.join("; ")
}

#[async_trait]
impl IssueTracker for JiraClient {
    fn server_url(&self) -> &str {
        &self.server_url
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_issue(&self, key: &IssueKey) -> JiraResult<Issue> {
        let builder = self.request(Method::GET, &format!("issue/{key}"))?;
        self.send_json(builder, &format!("Issue {key}")).await
    }

    /// Pages through `GET /search` until `max_results` issues are collected
    /// or the result set is exhausted.
    #[instrument(skip(self))]
    async fn search_issues(&self, jql: &str, max_results: u32) -> JiraResult<Vec<Issue>> {
        let mut issues: Vec<Issue> = Vec::new();

        while (issues.len() as u32) < max_results {
            let page_size = (max_results - issues.len() as u32).min(SEARCH_PAGE_SIZE);
            let builder = self.request(Method::GET, "search")?.query(&[
                ("jql", jql.to_string()),
                ("startAt", issues.len().to_string()),
                ("maxResults", page_size.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ]);

            let page: SearchResults = self.send_json(builder, "Search").await?;
            let received = page.issues.len();
            issues.extend(page.issues);

            if received == 0 || issues.len() as u64 >= page.total {
                break;
            }
        }

        info!(count = issues.len(), "Jira search completed");
        Ok(issues)
    }

    #[instrument(skip(self, issue), fields(project = %issue.project_key))]
    async fn create_issue(&self, issue: &NewIssue) -> JiraResult<CreatedIssue> {
        let mut fields = json!({
            "project": { "key": issue.project_key.as_str() },
            "summary": issue.summary,
            "description": issue.description,
            "issuetype": { "name": issue.issue_type },
        });
        if let Some(priority) = issue.priority.as_deref().filter(|p| !p.is_empty()) {
            fields["priority"] = json!({ "name": priority });
        }
        if let Some(due_date) = issue.due_date.as_deref().filter(|d| !d.is_empty()) {
            fields["duedate"] = json!(due_date);
        }

        let builder = self
            .request(Method::POST, "issue")?
            .json(&json!({ "fields": fields }));
        let created: CreatedIssue = self
            .send_json(builder, &format!("Project {}", issue.project_key))
            .await?;

        info!(key = %created.key, "Created Jira issue");
        Ok(created)
    }

    #[instrument(skip(self, update), fields(key = %key))]
    async fn update_issue(&self, key: &IssueKey, update: &IssueUpdate) -> JiraResult<()> {
        let mut fields = serde_json::Map::new();
        if let Some(summary) = update.summary.as_deref().filter(|s| !s.is_empty()) {
            fields.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = update.description.as_deref().filter(|d| !d.is_empty()) {
            fields.insert("description".to_string(), json!(description));
        }

        let builder = self
            .request(Method::PUT, &format!("issue/{key}"))?
            .json(&json!({ "fields": fields }));
        self.send(builder, &format!("Issue {key}")).await?;

        info!(key = %key, "Updated Jira issue");
        Ok(())
    }

    #[instrument(skip(self, body), fields(key = %key))]
    async fn add_comment(&self, key: &IssueKey, body: &str) -> JiraResult<Comment> {
        let builder = self
            .request(Method::POST, &format!("issue/{key}/comment"))?
            .json(&json!({ "body": body }));
        self.send_json(builder, &format!("Issue {key}")).await
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_comments(&self, key: &IssueKey) -> JiraResult<Vec<Comment>> {
        let builder = self.request(Method::GET, &format!("issue/{key}/comment"))?;
        let page: CommentPage = self.send_json(builder, &format!("Issue {key}")).await?;
        Ok(page.comments)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_transitions(&self, key: &IssueKey) -> JiraResult<Vec<Transition>> {
        let builder = self.request(Method::GET, &format!("issue/{key}/transitions"))?;
        let list: TransitionList = self.send_json(builder, &format!("Issue {key}")).await?;
        Ok(list.transitions)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn apply_transition(&self, key: &IssueKey, transition_id: &str) -> JiraResult<()> {
        let builder = self
            .request(Method::POST, &format!("issue/{key}/transitions"))?
            .json(&json!({ "transition": { "id": transition_id } }));
        self.send(builder, &format!("Issue {key}")).await?;

        info!(key = %key, transition_id = transition_id, "Transitioned Jira issue");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_project(&self, key: &ProjectKey) -> JiraResult<Project> {
        let builder = self.request(Method::GET, &format!("project/{key}"))?;
        self.send_json(builder, &format!("Project {key}")).await
    }
}
