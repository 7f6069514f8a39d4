//! Error types for Jira client operations.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while talking to the Jira REST API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Jira answered with an error status other than 401, 403 or 404.
    ///
    /// `message` holds the joined `errorMessages` and field errors from the
    /// response body, or the raw body if it was not a Jira error document.
    #[error("Jira API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The weekly summary configuration could not be read or parsed.
    #[error("Invalid Jira report configuration in {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("Failed to deserialize Jira response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The request could not be sent or the response body could not be read.
    #[error("HTTP request to Jira failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid issue key '{0}', expected a key like 'PROJ-123'")]
    InvalidIssueKey(String),

    #[error("Invalid project key '{0}'")]
    InvalidProjectKey(String),

    #[error("Invalid Jira server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    /// The issue, project or other resource does not exist or is not visible.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The credentials were rejected (401) or lack permission (403).
    #[error("Jira rejected the credentials: {0}")]
    Unauthorized(String),
}

/// Result type alias for Jira client operations.
pub type JiraResult<T> = Result<T, Error>;
