//! Error types for the MCP server.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum Error {
    /// The settings file exists but could not be read or parsed.
    #[error("Failed to load settings from {path}: {reason}")]
    Settings { path: String, reason: String },

    /// The Jira connection variables are incomplete.
    #[error("Jira is not configured. Missing environment variables: {}", missing.join(", "))]
    JiraNotConfigured { missing: Vec<String> },

    #[error("Jira client could not be created: {0}")]
    JiraClient(#[from] jira_client::Error),
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, Error>;
