//! Error types for GitHub client operations.
//!
//! This module defines the errors that can occur when reading repository
//! activity from the GitHub REST API and when loading the GitHub weekly
//! summary configuration.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.list_commits(&repo, since, until).await {
///     Ok(commits) => println!("{} commits", commits.len()),
///     Err(Error::NotFound) => eprintln!("Repository does not exist or is private"),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitHub API answered with an unexpected error status.
    #[error("GitHub API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Authentication or GitHub client initialization failure.
    ///
    /// This error occurs when:
    /// - The personal access token is invalid, expired or lacks scopes
    /// - The octocrab client cannot be built
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// The weekly summary configuration could not be read or parsed.
    #[error("Invalid GitHub report configuration in {path}: {reason}")]
    Config { path: String, reason: String },

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A repository reference was not of the form `owner/name`.
    #[error("Invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),

    /// The GitHub API returned a response in an unexpected format, or the
    /// request could not be sent.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    ///
    /// GitHub also answers 404 for private repositories the token cannot see.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}
