//! Tool requests and dispatch.
//!
//! Every tool the server exposes is a variant of [`ToolRequest`] carrying a
//! typed argument bundle. [`ToolDispatcher::dispatch`] routes a request to
//! its handler and always answers with text; failures are reported in the
//! text rather than as protocol errors.

use std::sync::Arc;

use jira_client::{IssueTracker, JiraClient};
use schemars::JsonSchema;
use serde::Deserialize;
use team_status_core::credentials::{JIRA_API_TOKEN, JIRA_EMAIL, JIRA_SERVER};
use team_status_core::{ConfigMap, Credentials, ReportPipeline, ReportRequest};
use tracing::{info, warn};

use crate::errors::{Error, ServerResult};
use crate::settings::{JiraAuthMethod, Settings};
use crate::{issues, report};

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;

pub const SEARCH_DEFAULT_MAX_RESULTS: u32 = 50;
pub const MY_ISSUES_DEFAULT_MAX_RESULTS: u32 = 20;
pub const PROJECT_ISSUES_DEFAULT_MAX_RESULTS: u32 = 50;
pub const DEFAULT_PRIORITY: &str = "Medium";

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// The Jira issue key (e.g., PROJ-123)
    pub issue_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL query string (e.g., 'project = PROJ AND status = Open')
    pub jql: String,
    /// Maximum number of results to return (default: 50)
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key (e.g., PROJ)
    pub project_key: String,
    /// Issue type (e.g., Task, Bug, Story)
    pub issue_type: String,
    /// Issue title/summary
    pub summary: String,
    /// Issue description
    pub description: String,
    /// Priority level (e.g., Blocker, Critical, Major, Minor). Default: Medium
    pub priority: Option<String>,
    /// Due date in YYYY-MM-DD format (optional)
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// The Jira issue key
    pub issue_key: String,
    /// New summary (optional)
    pub summary: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// The Jira issue key
    pub issue_key: String,
    /// Comment text
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct GetCommentsParams {
    /// The Jira issue key
    pub issue_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct TransitionIssueParams {
    /// The Jira issue key
    pub issue_key: String,
    /// Name of the transition (e.g., 'In Progress', 'Done')
    pub transition_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ProjectParams {
    /// Project key
    pub project_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct GetMyIssuesParams {
    /// Maximum number of results to return (default: 20)
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct GetProjectIssuesParams {
    /// Project key
    pub project_key: String,
    /// Maximum number of results to return (default: 50)
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct GenerateWeeklyStatusParams {
    /// Week start date (YYYY-MM-DD format, must be Wednesday). Defaults to current date.
    pub start_date: Option<String>,
    /// Week end date (YYYY-MM-DD format, must be Tuesday). Defaults to 7 days before start_date.
    pub end_date: Option<String>,
    /// GitHub API token for accessing repository data. If not provided, reads from GITHUB_TOKEN environment variable.
    pub github_token: Option<String>,
    /// Force regeneration even if report exists. Default: false
    pub regenerate: Option<bool>,
    /// Generate AI-powered executive summary. Default: true
    pub generate_summary: Option<bool>,
    /// Custom prompt for AI summary generation. If not provided, uses default prompt.
    pub summary_prompt: Option<String>,
    /// Override configuration file settings (e.g., team filters, repositories, etc.)
    pub config_overrides: Option<ConfigMap>,
}

impl From<GenerateWeeklyStatusParams> for ReportRequest {
    fn from(params: GenerateWeeklyStatusParams) -> Self {
        let defaults = ReportRequest::default();
        ReportRequest {
            start_date: params.start_date,
            end_date: params.end_date,
            github_token: params.github_token,
            regenerate: params.regenerate.unwrap_or(defaults.regenerate),
            generate_summary: params.generate_summary.unwrap_or(defaults.generate_summary),
            summary_prompt: params.summary_prompt,
            config_overrides: params.config_overrides,
        }
    }
}

/// A tool invocation with its arguments.
///
/// Deserializes from `{"name": "<tool>", "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolRequest {
    GetIssue(GetIssueParams),
    SearchIssues(SearchIssuesParams),
    CreateIssue(CreateIssueParams),
    UpdateIssue(UpdateIssueParams),
    AddComment(AddCommentParams),
    GetComments(GetCommentsParams),
    TransitionIssue(TransitionIssueParams),
    GetProject(ProjectParams),
    GetIssueTypes(ProjectParams),
    GetMyIssues(GetMyIssuesParams),
    GetProjectIssues(GetProjectIssuesParams),
    GenerateWeeklyStatus(GenerateWeeklyStatusParams),
}

impl ToolRequest {
    /// Names of every tool, in listing order.
    pub const NAMES: [&'static str; 12] = [
        "get_issue",
        "search_issues",
        "create_issue",
        "update_issue",
        "add_comment",
        "get_comments",
        "transition_issue",
        "get_project",
        "get_issue_types",
        "get_my_issues",
        "get_project_issues",
        "generate_weekly_status",
    ];

    /// Builds a request from a tool name and its JSON arguments.
    ///
    /// The error is the text returned to the caller: `Unknown tool: <name>`
    /// for an unrecognized name, `Error: <reason>` for bad arguments.
    pub fn from_call(name: &str, arguments: serde_json::Value) -> Result<Self, String> {
        if !Self::NAMES.contains(&name) {
            return Err(format!("Unknown tool: {name}"));
        }

        let arguments = match arguments {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };

        serde_json::from_value(serde_json::json!({ "name": name, "arguments": arguments }))
            .map_err(|e| format!("Error: {e}"))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolRequest::GetIssue(_) => "get_issue",
            ToolRequest::SearchIssues(_) => "search_issues",
            ToolRequest::CreateIssue(_) => "create_issue",
            ToolRequest::UpdateIssue(_) => "update_issue",
            ToolRequest::AddComment(_) => "add_comment",
            ToolRequest::GetComments(_) => "get_comments",
            ToolRequest::TransitionIssue(_) => "transition_issue",
            ToolRequest::GetProject(_) => "get_project",
            ToolRequest::GetIssueTypes(_) => "get_issue_types",
            ToolRequest::GetMyIssues(_) => "get_my_issues",
            ToolRequest::GetProjectIssues(_) => "get_project_issues",
            ToolRequest::GenerateWeeklyStatus(_) => "generate_weekly_status",
        }
    }
}

/// Jira access for the issue tools.
///
/// The client is built once at start-up. When the connection settings are
/// incomplete the reason is kept and reported by every issue tool.
#[derive(Clone)]
pub enum JiraAccess {
    Ready(Arc<dyn IssueTracker>),
    Unavailable(String),
}

impl JiraAccess {
    /// Builds the Jira client from the connection variables.
    pub fn connect(credentials: &Credentials, method: JiraAuthMethod) -> Self {
        match connect_jira(credentials, method) {
            Ok(client) => {
                info!(server = client.server_url(), "Jira issue tools enabled");
                JiraAccess::Ready(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "Jira issue tools are unavailable");
                JiraAccess::Unavailable(e.to_string())
            }
        }
    }
}

fn credential<'a>(credentials: &'a Credentials, name: &str) -> Option<&'a str> {
    match name {
        JIRA_SERVER => credentials.jira_server.as_deref(),
        JIRA_EMAIL => credentials.jira_email.as_deref(),
        JIRA_API_TOKEN => credentials.jira_api_token.as_deref(),
        _ => None,
    }
}

fn connect_jira(credentials: &Credentials, method: JiraAuthMethod) -> ServerResult<JiraClient> {
    let missing: Vec<String> = method
        .required_variables()
        .iter()
        .filter(|name| credential(credentials, name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::JiraNotConfigured { missing });
    }

    let server = credential(credentials, JIRA_SERVER).unwrap_or_default();
    let auth = method.auth(
        credential(credentials, JIRA_EMAIL).unwrap_or_default(),
        credential(credentials, JIRA_API_TOKEN).unwrap_or_default(),
    );
    Ok(JiraClient::new(server, auth)?)
}

/// Routes tool requests to their handlers.
#[derive(Clone)]
pub struct ToolDispatcher {
    jira: JiraAccess,
    pipeline: Arc<ReportPipeline>,
    credentials: Credentials,
    settings: Settings,
}

impl ToolDispatcher {
    pub fn new(
        jira: JiraAccess,
        pipeline: Arc<ReportPipeline>,
        credentials: Credentials,
        settings: Settings,
    ) -> Self {
        Self {
            jira,
            pipeline,
            credentials,
            settings,
        }
    }

    /// Runs one tool and returns its text result.
    pub async fn dispatch(&self, request: ToolRequest) -> String {
        let tool = request.name();
        info!(tool = tool, "Handling tool call");

        if let ToolRequest::GenerateWeeklyStatus(params) = request {
            return self.generate_weekly_status(params).await;
        }

        match &self.jira {
            JiraAccess::Ready(tracker) => self.dispatch_issue(tracker.as_ref(), request).await,
            JiraAccess::Unavailable(reason) => {
                warn!(tool = tool, "Jira issue tool called without a Jira connection");
                format!("Error: {reason}")
            }
        }
    }

    async fn generate_weekly_status(&self, params: GenerateWeeklyStatusParams) -> String {
        let outcome = self
            .pipeline
            .run(&params.into(), &self.credentials)
            .await;
        report::render(outcome)
    }

    async fn dispatch_issue(&self, tracker: &dyn IssueTracker, request: ToolRequest) -> String {
        match request {
            ToolRequest::GetIssue(p) => issues::get_issue(tracker, &p.issue_key).await,
            ToolRequest::SearchIssues(p) => {
                let max = self
                    .settings
                    .max_results(p.max_results, SEARCH_DEFAULT_MAX_RESULTS);
                issues::search_issues(tracker, &p.jql, max).await
            }
            ToolRequest::CreateIssue(p) => issues::create_issue(tracker, p).await,
            ToolRequest::UpdateIssue(p) => {
                issues::update_issue(tracker, &p.issue_key, p.summary, p.description).await
            }
            ToolRequest::AddComment(p) => {
                issues::add_comment(tracker, &p.issue_key, &p.comment).await
            }
            ToolRequest::GetComments(p) => issues::get_comments(tracker, &p.issue_key).await,
            ToolRequest::TransitionIssue(p) => {
                issues::transition_issue(tracker, &p.issue_key, &p.transition_name).await
            }
            ToolRequest::GetProject(p) => issues::get_project(tracker, &p.project_key).await,
            ToolRequest::GetIssueTypes(p) => {
                issues::get_issue_types(tracker, &p.project_key).await
            }
            ToolRequest::GetMyIssues(p) => {
                let max = self
                    .settings
                    .max_results(p.max_results, MY_ISSUES_DEFAULT_MAX_RESULTS);
                issues::get_my_issues(tracker, max).await
            }
            ToolRequest::GetProjectIssues(p) => {
                let max = self
                    .settings
                    .max_results(p.max_results, PROJECT_ISSUES_DEFAULT_MAX_RESULTS);
                issues::get_project_issues(tracker, &p.project_key, max).await
            }
            ToolRequest::GenerateWeeklyStatus(params) => self.generate_weekly_status(params).await,
        }
    }
}
