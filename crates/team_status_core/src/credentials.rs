//! Credentials for the report sources.
//!
//! Values are opaque strings taken from the environment, optionally overridden
//! per request. They are never written to logs.

use std::fmt;

use crate::errors::{ReportError, ReportResult};

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

pub const JIRA_SERVER: &str = "JIRA_SERVER";
pub const JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Possibly incomplete credentials as found in the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub jira_server: Option<String>,
    pub jira_email: Option<String>,
    pub jira_api_token: Option<String>,
    pub github_token: Option<String>,
}

impl Credentials {
    /// Read all four values from the process environment. Empty values count
    /// as absent.
    pub fn from_env() -> Self {
        Self {
            jira_server: read_env(JIRA_SERVER),
            jira_email: read_env(JIRA_EMAIL),
            jira_api_token: read_env(JIRA_API_TOKEN),
            github_token: read_env(GITHUB_TOKEN),
        }
    }

    /// Use `token` as the GitHub token when it is non-empty.
    pub fn with_github_token(mut self, token: Option<&str>) -> Self {
        if let Some(token) = non_empty(token) {
            self.github_token = Some(token.to_string());
        }
        self
    }

    /// Check that every credential is present.
    ///
    /// # Errors
    /// Returns `ReportError::MissingCredentials` listing every absent name in
    /// the order `JIRA_SERVER, JIRA_EMAIL, JIRA_API_TOKEN, GITHUB_TOKEN`.
    pub fn validate(&self) -> ReportResult<ValidatedCredentials> {
        match (
            non_empty(self.jira_server.as_deref()),
            non_empty(self.jira_email.as_deref()),
            non_empty(self.jira_api_token.as_deref()),
            non_empty(self.github_token.as_deref()),
        ) {
            (Some(server), Some(email), Some(api_token), Some(github_token)) => {
                Ok(ValidatedCredentials {
                    jira_server: server.to_string(),
                    jira_email: email.to_string(),
                    jira_api_token: api_token.to_string(),
                    github_token: github_token.to_string(),
                })
            }
            (server, email, api_token, github_token) => {
                let missing = [
                    (JIRA_SERVER, server.is_none()),
                    (JIRA_EMAIL, email.is_none()),
                    (JIRA_API_TOKEN, api_token.is_none()),
                    (GITHUB_TOKEN, github_token.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name));

                Err(ReportError::missing_credentials(missing))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("jira_server", &self.jira_server)
            .field("jira_email", &self.jira_email)
            .field("jira_api_token", &self.jira_api_token.as_ref().map(|_| "<redacted>"))
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A complete set of credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCredentials {
    jira_server: String,
    jira_email: String,
    jira_api_token: String,
    github_token: String,
}

impl ValidatedCredentials {
    pub fn jira_server(&self) -> &str {
        &self.jira_server
    }

    pub fn jira_email(&self) -> &str {
        &self.jira_email
    }

    pub fn jira_api_token(&self) -> &str {
        &self.jira_api_token
    }

    pub fn github_token(&self) -> &str {
        &self.github_token
    }
}

impl fmt::Debug for ValidatedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCredentials")
            .field("jira_server", &self.jira_server)
            .field("jira_email", &self.jira_email)
            .field("jira_api_token", &"<redacted>")
            .field("github_token", &"<redacted>")
            .finish()
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
