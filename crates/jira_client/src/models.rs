//! # Models
//!
//! Jira REST API v2 payloads used by the client, plus the validated key
//! types that identify issues and projects.
//!
//! Response types model only the fields the tools render. Optional Jira
//! fields are `Option`s so partially populated issues still deserialize.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

const ISSUE_KEY_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*-[0-9]+$";
const PROJECT_KEY_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

/// Validated issue key such as `PROJ-123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueKey(String);

impl IssueKey {
    /// Create a new issue key with validation.
    ///
    /// Surrounding whitespace is removed and the key is upper-cased.
    ///
    /// # Errors
    /// Returns `Error::InvalidIssueKey` unless the key is a project key
    /// followed by `-` and a number.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        let normalized = key.trim().to_ascii_uppercase();
        if !matches_pattern(ISSUE_KEY_PATTERN, &normalized) {
            return Err(Error::InvalidIssueKey(key));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated project key such as `PROJ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// # Errors
    /// Returns `Error::InvalidProjectKey` unless the key starts with a letter
    /// and contains only letters, digits and underscores.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        let normalized = key.trim().to_ascii_uppercase();
        if !matches_pattern(PROJECT_KEY_PATTERN, &normalized) {
            return Err(Error::InvalidProjectKey(key));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named Jira entity such as a priority or issue type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub display_name: String,
    pub email_address: Option<String>,
}

/// Coarse status grouping: `new`, `indeterminate` or `done`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusCategory {
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub name: String,
    pub status_category: Option<StatusCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectRef {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IssueFields {
    pub summary: String,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Named>,
    pub assignee: Option<UserRef>,
    pub reporter: Option<UserRef>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolutiondate: Option<String>,
    pub project: Option<ProjectRef>,
    pub issuetype: Option<Named>,
}

/// An issue as returned by `GET /rest/api/2/issue/{key}` and search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl Issue {
    pub fn status_name(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("Unknown")
    }

    /// Status category key, `new` when Jira does not report one.
    pub fn status_category(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .and_then(|s| s.status_category.as_ref())
            .map(|c| c.key.as_str())
            .unwrap_or("new")
    }

    pub fn priority_name(&self) -> &str {
        self.fields
            .priority
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("None")
    }

    pub fn assignee_name(&self) -> &str {
        self.fields
            .assignee
            .as_ref()
            .map(|u| u.display_name.as_str())
            .unwrap_or("Unassigned")
    }

    pub fn reporter_name(&self) -> &str {
        self.fields
            .reporter
            .as_ref()
            .map(|u| u.display_name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn description(&self) -> &str {
        self.fields
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }

    pub fn issue_type_name(&self) -> &str {
        self.fields
            .issuetype
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn project_name(&self) -> &str {
        self.fields
            .project
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub total: u64,
}

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub project_key: ProjectKey,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
    pub priority: Option<String>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// Fields to change on an existing issue. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().map_or(true, str::is_empty)
            && self.description.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    pub id: Option<String>,
    pub author: Option<UserRef>,
    pub body: String,
    pub created: Option<String>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|u| u.display_name.as_str())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub lead: Option<UserRef>,
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub issue_types: Vec<IssueType>,
}

/// Outcome of a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was applied; holds the issue's status afterwards.
    Applied { new_status: String },
    /// No transition matched the requested name.
    NotAvailable { available: Vec<String> },
}
