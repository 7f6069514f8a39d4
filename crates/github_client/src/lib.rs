//! Crate for reading repository activity from the GitHub REST API.
//!
//! This crate provides a client that authenticates with a personal access
//! token and lists the pull requests and commits of a repository, plus the
//! generator that turns a week of that activity into a markdown section.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::{Octocrab, Result as OctocrabResult};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

pub mod errors;
pub use errors::Error;

pub mod models;
use models::{Commit, PullRequest, RepositoryRef};

pub mod weekly_summary;
pub use weekly_summary::{GitHubReportConfig, WeeklyGitHubSummary};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Number of items requested per page.
const PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched for a single listing.
const MAX_PAGES: u32 = 10;

/// Read access to the activity of a repository.
#[async_trait]
pub trait ActivityClient: Send + Sync {
    /// Lists pull requests updated at or after `since`, most recently updated first.
    async fn list_pull_requests(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>, Error>;

    /// Lists commits on the default branch authored between `since` and `until`.
    async fn list_commits(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Commit>, Error>;
}

#[derive(Debug, Serialize)]
struct PullsQuery {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    per_page: u32,
    page: u32,
}

#[derive(Debug, Serialize)]
struct CommitsQuery {
    since: String,
    until: String,
    per_page: u32,
    page: u32,
}

/// A client for reading repository activity from the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActivityClient for GitHubClient {
    /// Pages through `GET /repos/{owner}/{repo}/pulls?state=all&sort=updated`
    /// until a page ends before `since` or runs short.
    ///
    /// # Errors
    /// Returns `Error::NotFound` when the repository does not exist or is not
    /// visible to the token, and the mapped API error otherwise.
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_pull_requests(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>, Error> {
        let path = format!("/repos/{}/{}/pulls", repo.owner(), repo.name());
        let mut pulls = Vec::new();

        for page in 1..=MAX_PAGES {
            let query = PullsQuery {
                state: "all",
                sort: "updated",
                direction: "desc",
                per_page: PAGE_SIZE,
                page,
            };

            debug!("Making API call to: {} (page {})", path, page);
            let response: OctocrabResult<Vec<PullRequest>> =
                self.client.get(&path, Some(&query)).await;
            let batch = response.map_err(|e| map_octocrab_error("Failed to list pull requests", e))?;

            let batch_len = batch.len();
            let reached_older = batch.last().is_some_and(|pr| pr.updated_at < since);
            pulls.extend(batch.into_iter().filter(|pr| pr.updated_at >= since));

            if batch_len < PAGE_SIZE as usize || reached_older {
                break;
            }
        }

        info!(
            repo = %repo,
            count = pulls.len(),
            "Retrieved pull requests updated in window"
        );
        Ok(pulls)
    }

    /// Pages through `GET /repos/{owner}/{repo}/commits?since=..&until=..`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` when the repository does not exist or is not
    /// visible to the token, and the mapped API error otherwise.
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_commits(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Commit>, Error> {
        let path = format!("/repos/{}/{}/commits", repo.owner(), repo.name());
        let mut commits = Vec::new();

        for page in 1..=MAX_PAGES {
            let query = CommitsQuery {
                since: since.to_rfc3339_opts(SecondsFormat::Secs, true),
                until: until.to_rfc3339_opts(SecondsFormat::Secs, true),
                per_page: PAGE_SIZE,
                page,
            };

            debug!("Making API call to: {} (page {})", path, page);
            let response: OctocrabResult<Vec<Commit>> = self.client.get(&path, Some(&query)).await;
            let batch = response.map_err(|e| map_octocrab_error("Failed to list commits", e))?;

            let batch_len = batch.len();
            commits.extend(batch);

            if batch_len < PAGE_SIZE as usize {
                break;
            }
        }

        info!(
            repo = %repo,
            count = commits.len(),
            "Retrieved commits in window"
        );
        Ok(commits)
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Errors
/// Returns `Error::AuthError` if the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build Octocrab client with personal token");
            Error::AuthError("Failed to build GitHub client from token".to_string())
        })
}

/// Logs an octocrab failure and translates it into a crate error.
fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    let mapped = match &e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let is_rate_limit = source.message.to_ascii_lowercase().contains("rate limit");
            match status {
                404 => Error::NotFound,
                403 | 429 if is_rate_limit => Error::RateLimitExceeded,
                401 | 403 => Error::AuthError(source.message.clone()),
                _ => Error::ApiError {
                    status,
                    message: source.message.clone(),
                },
            }
        }
        _ => Error::InvalidResponse,
    };

    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = source;
            error!(
                error_message = err.message,
                status = err.status_code.as_u16(),
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
