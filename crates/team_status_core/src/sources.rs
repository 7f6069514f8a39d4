//! Report source collaborators and their aggregation.
//!
//! The pipeline does not know how the Jira or GitHub sections are produced. It
//! asks a [`GeneratorFactory`] to build one [`ReportGenerator`] per source from
//! a configuration file location and the run's credentials, then runs both
//! generators against the same reporting window.
//!
//! A failure in one source never affects the other. Construction errors,
//! generation errors and timeouts all become an inline error line in that
//! source's section of the combined report.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, error, info};

use crate::config::SourceName;
use crate::credentials::ValidatedCredentials;
use crate::errors::ReportError;
use crate::window::ReportingWindow;

#[cfg(test)]
#[path = "sources_tests.rs"]
mod tests;

/// Default upper bound on a single source's generation time.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(300);

/// Format of the generation timestamp in the report footer.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output of one generator run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    /// Markdown section for the combined report.
    pub text: String,
    /// Free-form statistics about the run. Logged, not rendered.
    pub metadata: serde_json::Value,
}

impl GeneratedReport {
    pub fn new(text: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// Produces one source's section of the weekly report.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, window: &ReportingWindow) -> anyhow::Result<GeneratedReport>;
}

/// Builds the generators for a single pipeline run.
pub trait GeneratorFactory: Send + Sync {
    /// Build the issue-tracker generator reading its configuration from
    /// `config_location`.
    fn jira(
        &self,
        config_location: &Path,
        credentials: &ValidatedCredentials,
    ) -> anyhow::Result<Box<dyn ReportGenerator>>;

    /// Build the code-host generator reading its configuration from
    /// `config_location`.
    fn github(
        &self,
        config_location: &Path,
        credentials: &ValidatedCredentials,
    ) -> anyhow::Result<Box<dyn ReportGenerator>>;
}

/// One source's contribution to the combined report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: SourceName,
    pub text: String,
    pub failed: bool,
}

impl SourceReport {
    pub fn succeeded(source: SourceName, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
            failed: false,
        }
    }

    /// A section holding the inline error marker for `source`.
    pub fn failed(source: SourceName, reason: impl ToString) -> Self {
        Self {
            source,
            text: ReportError::source_generation(source.display_name(), reason).to_string(),
            failed: true,
        }
    }
}

/// The sections gathered for one reporting window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatheredReports {
    pub jira: SourceReport,
    pub github: SourceReport,
}

/// Runs both report sources and isolates their failures.
#[derive(Clone)]
pub struct SourceAggregator {
    factory: Arc<dyn GeneratorFactory>,
    timeout: Option<Duration>,
}

impl SourceAggregator {
    pub fn new(factory: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            factory,
            timeout: Some(DEFAULT_SOURCE_TIMEOUT),
        }
    }

    /// Bound each source's generation time. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run both sources concurrently against `window`.
    ///
    /// Never fails: a failing source is represented by its error marker.
    pub async fn gather(
        &self,
        window: &ReportingWindow,
        jira_config: &Path,
        github_config: &Path,
        credentials: &ValidatedCredentials,
    ) -> GatheredReports {
        info!(window = %window, "Gathering source reports");

        let jira_generator = self.factory.jira(jira_config, credentials);
        let github_generator = self.factory.github(github_config, credentials);

        let (jira, github) = tokio::join!(
            self.run_source(SourceName::Jira, jira_generator, window),
            self.run_source(SourceName::Github, github_generator, window),
        );

        GatheredReports { jira, github }
    }

    async fn run_source(
        &self,
        source: SourceName,
        generator: anyhow::Result<Box<dyn ReportGenerator>>,
        window: &ReportingWindow,
    ) -> SourceReport {
        let result = match generator {
            Ok(generator) => self.generate_bounded(generator.as_ref(), window).await,
            Err(e) => Err(e.context("failed to construct generator")),
        };

        match result {
            Ok(report) => {
                info!(
                    source = %source,
                    size = report.text.chars().count(),
                    "Source report generated"
                );
                debug!(source = %source, metadata = %report.metadata, "Source report metadata");
                SourceReport::succeeded(source, report.text)
            }
            Err(e) => {
                error!(source = %source, error = %format!("{e:#}"), "Source report failed");
                SourceReport::failed(source, format!("{e:#}"))
            }
        }
    }

    async fn generate_bounded(
        &self,
        generator: &dyn ReportGenerator,
        window: &ReportingWindow,
    ) -> anyhow::Result<GeneratedReport> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, generator.generate(window))
                .await
                .map_err(|_| anyhow!("timed out after {} seconds", limit.as_secs()))?,
            None => generator.generate(window).await,
        }
    }
}

/// Assemble the combined report document.
///
/// Section order is fixed: header, Jira section, GitHub section, footer.
pub fn combine(
    window: &ReportingWindow,
    jira: &SourceReport,
    github: &SourceReport,
    generated_at: NaiveDateTime,
) -> String {
    format!(
        "# Weekly Team Status Report\n\
         ## Period: {start} to {end}\n\
         \n\
         ---\n\
         \n\
         {jira}\n\
         \n\
         ---\n\
         \n\
         {github}\n\
         \n\
         ---\n\
         \n\
         *Report generated: {timestamp}*\n",
        start = window.start_str(),
        end = window.end_str(),
        jira = jira.text,
        github = github.text,
        timestamp = generated_at.format(TIMESTAMP_FORMAT),
    )
}
