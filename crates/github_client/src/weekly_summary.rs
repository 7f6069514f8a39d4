//! Weekly GitHub activity summary.
//!
//! Reads the configured repositories' pull requests and commits for one
//! period and renders them as a markdown section. A repository that cannot
//! be read is reported inline and does not stop the others.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::models::{Commit, PullRequest, RepositoryRef};
use crate::{create_token_client, ActivityClient, Error, GitHubClient};

#[cfg(test)]
#[path = "weekly_summary_tests.rs"]
mod tests;

const DEFAULT_TITLE: &str = "GitHub Activity";

/// Contents of `github_config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitHubReportConfig {
    /// Section heading. Defaults to `GitHub Activity`.
    pub title: Option<String>,
    /// Repositories to report on, as `owner/name`.
    pub repositories: Vec<RepositoryRef>,
    /// GitHub logins to include. Empty means everyone.
    pub team_members: Vec<String>,
}

impl GitHubReportConfig {
    /// Load the configuration from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or does not match
    /// the expected layout.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config_error = |reason: String| Error::Config {
            path: path.display().to_string(),
            reason,
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = ?path, "GitHub report config not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(config_error(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| config_error(e.to_string()))
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    fn includes(&self, login: Option<&str>) -> bool {
        if self.team_members.is_empty() {
            return true;
        }
        login.is_some_and(|login| {
            self.team_members
                .iter()
                .any(|member| member.eq_ignore_ascii_case(login))
        })
    }
}

/// One repository's activity for the period.
#[derive(Debug, Default)]
struct RepositoryActivity {
    merged: Vec<PullRequest>,
    opened: Vec<PullRequest>,
    in_review: Vec<PullRequest>,
    commits: Vec<Commit>,
}

impl RepositoryActivity {
    fn is_empty(&self) -> bool {
        self.merged.is_empty()
            && self.opened.is_empty()
            && self.in_review.is_empty()
            && self.commits.is_empty()
    }
}

/// Generates the GitHub section of the weekly report.
pub struct WeeklyGitHubSummary {
    client: Arc<dyn ActivityClient>,
    config: GitHubReportConfig,
}

impl WeeklyGitHubSummary {
    pub fn new(client: Arc<dyn ActivityClient>, config: GitHubReportConfig) -> Self {
        Self { client, config }
    }

    /// Build a generator that reads `config_file` and talks to github.com with `token`.
    pub fn from_config_file(config_file: &Path, token: &str) -> Result<Self, Error> {
        let config = GitHubReportConfig::load(config_file)?;
        let client = GitHubClient::new(create_token_client(token)?);
        info!(
            config_file = ?config_file,
            repositories = config.repositories.len(),
            "Created GitHub weekly summary"
        );
        Ok(Self::new(Arc::new(client), config))
    }

    /// Render activity between `first_day` and `last_day`, both inclusive.
    ///
    /// Returns the markdown section and a metadata object with counts.
    #[instrument(skip(self))]
    pub async fn generate_report(
        &self,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<(String, serde_json::Value), Error> {
        let since = start_of_day(first_day);
        let until = start_of_day(last_day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX));

        let mut sections = String::new();
        let mut totals = RepositoryActivity::default();
        let mut failed = Vec::new();

        for repo in &self.config.repositories {
            let _ = writeln!(sections, "### {repo}\n");

            match self.collect(repo, since, until).await {
                Ok(activity) => {
                    render_repository(&mut sections, &activity);
                    totals.merged.extend(activity.merged);
                    totals.opened.extend(activity.opened);
                    totals.in_review.extend(activity.in_review);
                    totals.commits.extend(activity.commits);
                }
                Err(e) => {
                    warn!(repo = %repo, error = %e, "Failed to load repository activity");
                    let _ = writeln!(sections, "*Error loading repository: {e}*\n");
                    failed.push(repo.to_string());
                }
            }
        }

        let mut report = format!("## {}\n\n", self.config.title());
        if self.config.repositories.is_empty() {
            report.push_str("_No repositories configured._\n");
        } else {
            let _ = writeln!(
                report,
                "**Repositories:** {} | **PRs merged:** {} | **PRs opened:** {} | **Commits:** {}\n",
                self.config.repositories.len(),
                totals.merged.len(),
                totals.opened.len(),
                totals.commits.len()
            );
            report.push_str(sections.trim_end());
            report.push('\n');
        }

        let metadata = json!({
            "repositories": self.config.repositories.len(),
            "failed_repositories": failed,
            "prs_merged": totals.merged.len(),
            "prs_opened": totals.opened.len(),
            "prs_in_review": totals.in_review.len(),
            "commits": totals.commits.len(),
        });

        info!(metadata = %metadata, "Generated GitHub weekly summary");
        Ok((report, metadata))
    }

    async fn collect(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<RepositoryActivity, Error> {
        let in_period = |t: &DateTime<Utc>| *t >= since && *t < until;
        let mut activity = RepositoryActivity::default();

        let pulls = self.client.list_pull_requests(repo, since).await?;
        for pr in pulls
            .into_iter()
            .filter(|pr| in_period(&pr.updated_at) && self.config.includes(pr.author()))
        {
            if pr.merged_at.as_ref().is_some_and(in_period) {
                activity.merged.push(pr);
            } else if in_period(&pr.created_at) {
                activity.opened.push(pr);
            } else if pr.is_open() {
                activity.in_review.push(pr);
            }
        }

        activity.commits = self
            .client
            .list_commits(repo, since, until)
            .await?
            .into_iter()
            .filter(|c| self.config.includes(c.author_login()))
            .collect();

        Ok(activity)
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn render_repository(out: &mut String, activity: &RepositoryActivity) {
    if activity.is_empty() {
        out.push_str("_No activity in this period._\n\n");
        return;
    }

    for (heading, pulls) in [
        ("Merged", &activity.merged),
        ("Opened", &activity.opened),
        ("In review", &activity.in_review),
    ] {
        if pulls.is_empty() {
            continue;
        }
        let _ = writeln!(out, "**{heading} ({})**", pulls.len());
        for pr in pulls {
            let author = pr.author().unwrap_or("unknown");
            let _ = writeln!(out, "- #{} {} (@{author})", pr.number, pr.title);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "**Commits:** {}\n", activity.commits.len());
}
