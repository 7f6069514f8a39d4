//! Adapters that plug the Jira and GitHub weekly summaries into the report
//! pipeline.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use github_client::WeeklyGitHubSummary;
use jira_client::WeeklyJiraSummary;
use team_status_core::{
    GeneratedReport, GeneratorFactory, ReportGenerator, ReportingWindow, ValidatedCredentials,
};
use tracing::debug;

use crate::settings::JiraAuthMethod;

#[cfg(test)]
#[path = "generators_tests.rs"]
mod tests;

/// Builds the live Jira and GitHub generators for each report.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGeneratorFactory {
    jira_auth: JiraAuthMethod,
}

impl DefaultGeneratorFactory {
    pub fn new(jira_auth: JiraAuthMethod) -> Self {
        Self { jira_auth }
    }
}

impl GeneratorFactory for DefaultGeneratorFactory {
    fn jira(
        &self,
        config_location: &Path,
        credentials: &ValidatedCredentials,
    ) -> anyhow::Result<Box<dyn ReportGenerator>> {
        debug!(config_location = ?config_location, "Building Jira report generator");
        let auth = self
            .jira_auth
            .auth(credentials.jira_email(), credentials.jira_api_token());
        let summary =
            WeeklyJiraSummary::from_config_file(config_location, credentials.jira_server(), auth)
                .context("invalid Jira report settings")?;
        Ok(Box::new(JiraReportGenerator::new(summary)))
    }

    fn github(
        &self,
        config_location: &Path,
        credentials: &ValidatedCredentials,
    ) -> anyhow::Result<Box<dyn ReportGenerator>> {
        debug!(config_location = ?config_location, "Building GitHub report generator");
        let summary =
            WeeklyGitHubSummary::from_config_file(config_location, credentials.github_token())
                .context("invalid GitHub report settings")?;
        Ok(Box::new(GitHubReportGenerator::new(summary)))
    }
}

/// Jira section of the weekly report.
///
/// The window runs from `end` (the earlier Tuesday) to `start` (the later
/// Wednesday), so both summaries get `(end, start)` as their inclusive range.
pub struct JiraReportGenerator {
    summary: WeeklyJiraSummary,
}

impl JiraReportGenerator {
    pub fn new(summary: WeeklyJiraSummary) -> Self {
        Self { summary }
    }
}

#[async_trait]
impl ReportGenerator for JiraReportGenerator {
    async fn generate(&self, window: &ReportingWindow) -> anyhow::Result<GeneratedReport> {
        let (text, metadata) = self
            .summary
            .generate_report(window.end(), window.start())
            .await?;
        Ok(GeneratedReport::new(text, metadata))
    }
}

pub struct GitHubReportGenerator {
    summary: WeeklyGitHubSummary,
}

impl GitHubReportGenerator {
    pub fn new(summary: WeeklyGitHubSummary) -> Self {
        Self { summary }
    }
}

#[async_trait]
impl ReportGenerator for GitHubReportGenerator {
    async fn generate(&self, window: &ReportingWindow) -> anyhow::Result<GeneratedReport> {
        let (text, metadata) = self
            .summary
            .generate_report(window.end(), window.start())
            .await?;
        Ok(GeneratedReport::new(text, metadata))
    }
}
