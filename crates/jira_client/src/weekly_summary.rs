//! Weekly Jira activity summary.
//!
//! Runs one JQL search for the issues updated in a period and renders them
//! as a markdown section grouped by status category.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::models::Issue;
use crate::{Error, IssueTracker, JiraAuth, JiraClient, JiraResult};

#[cfg(test)]
#[path = "weekly_summary_tests.rs"]
mod tests;

const DEFAULT_TITLE: &str = "Jira Activity";
const DEFAULT_MAX_RESULTS: u32 = 200;

/// Contents of `jira_config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JiraReportConfig {
    /// Section heading. Defaults to `Jira Activity`.
    pub title: Option<String>,
    /// Extra JQL combined with the date filter, e.g. `project = CORE`.
    pub base_jql: Option<String>,
    /// Assignee emails to include. Empty means everyone.
    pub team_emails: Vec<String>,
    pub max_results: u32,
}

impl Default for JiraReportConfig {
    fn default() -> Self {
        Self {
            title: None,
            base_jql: None,
            team_emails: Vec::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl JiraReportConfig {
    /// Load the configuration from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> JiraResult<Self> {
        let config_error = |reason: String| Error::Config {
            path: path.display().to_string(),
            reason,
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = ?path, "Jira report config not found, using defaults");
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

    /// JQL selecting issues updated between the two days, inclusive.
    pub fn period_jql(&self, first_day: NaiveDate, last_day: NaiveDate) -> String {
        let mut clauses = Vec::new();

        if let Some(base) = self.base_jql.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            clauses.push(format!("({base})"));
        }
        clauses.push(format!(
            "updated >= \"{}\" AND updated <= \"{} 23:59\"",
            first_day.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d")
        ));
        if !self.team_emails.is_empty() {
            let quoted: Vec<String> = self
                .team_emails
                .iter()
                .map(|email| format!("\"{}\"", email.replace('"', "\\\"")))
                .collect();
            clauses.push(format!("assignee in ({})", quoted.join(", ")));
        }

        format!("{} ORDER BY updated DESC", clauses.join(" AND "))
    }
}

/// Generates the Jira section of the weekly report.
pub struct WeeklyJiraSummary {
    tracker: Arc<dyn IssueTracker>,
    config: JiraReportConfig,
}

impl WeeklyJiraSummary {
    pub fn new(tracker: Arc<dyn IssueTracker>, config: JiraReportConfig) -> Self {
        Self { tracker, config }
    }

    /// Build a generator that reads `config_file` and talks to `server`.
    pub fn from_config_file(config_file: &Path, server: &str, auth: JiraAuth) -> JiraResult<Self> {
        let config = JiraReportConfig::load(config_file)?;
        let client = JiraClient::new(server, auth)?;
        info!(config_file = ?config_file, server = server, "Created Jira weekly summary");
        Ok(Self::new(Arc::new(client), config))
    }

    /// Render the issues updated between `first_day` and `last_day`.
    ///
    /// Returns the markdown section and a metadata object with counts.
    #[instrument(skip(self))]
    pub async fn generate_report(
        &self,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> JiraResult<(String, serde_json::Value)> {
        let jql = self.config.period_jql(first_day, last_day);
        let issues = self
            .tracker
            .search_issues(&jql, self.config.max_results)
            .await?;

        let mut done = Vec::new();
        let mut in_progress = Vec::new();
        let mut to_do = Vec::new();
        for issue in &issues {
            match issue.status_category() {
                "done" => done.push(issue),
                "indeterminate" => in_progress.push(issue),
                _ => to_do.push(issue),
            }
        }

        let mut report = format!("## {}\n\n", self.config.title());
        if issues.is_empty() {
            report.push_str("_No issues updated in this period._\n");
        } else {
            let _ = writeln!(
                report,
                "**Issues updated:** {} | **Completed:** {} | **In progress:** {} | **To do:** {}\n",
                issues.len(),
                done.len(),
                in_progress.len(),
                to_do.len()
            );
            let mut sections = String::new();
            for (heading, group) in [
                ("Completed", &done),
                ("In progress", &in_progress),
                ("To do", &to_do),
            ] {
                render_group(&mut sections, heading, group, self.tracker.as_ref());
            }
            report.push_str(sections.trim_end());
            report.push('\n');
        }

        let metadata = json!({
            "jql": jql,
            "total": issues.len(),
            "done": done.len(),
            "in_progress": in_progress.len(),
            "to_do": to_do.len(),
        });

        info!(metadata = %metadata, "Generated Jira weekly summary");
        Ok((report, metadata))
    }
}

fn render_group(out: &mut String, heading: &str, issues: &[&Issue], tracker: &dyn IssueTracker) {
    if issues.is_empty() {
        return;
    }
    let _ = writeln!(out, "### {heading} ({})\n", issues.len());
    for issue in issues {
        let _ = writeln!(
            out,
            "- [{key}]({url}) {summary} ({status}, {assignee})",
            key = issue.key,
            url = tracker.browse_url(&issue.key),
            summary = issue.fields.summary,
            status = issue.status_name(),
            assignee = issue.assignee_name()
        );
    }
    out.push('\n');
}
