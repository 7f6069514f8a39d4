//! MCP server for Jira issues and weekly team status reports.
//!
//! The server exposes the Jira issue tools and `generate_weekly_status` over
//! the stdio transport. Weekly reports are produced by the
//! [`team_status_core`] pipeline, fed by the Jira and GitHub summaries.
//!
//! # Environment
//!
//! - `JIRA_SERVER`, `JIRA_EMAIL`, `JIRA_API_TOKEN`, `GITHUB_TOKEN`: credentials,
//!   optionally from a `.env` file.
//! - `TEAM_STATUS_CONFIG`: settings file (default `team_status.toml`).
//! - `TEAM_STATUS_REPORTS_DIR`, `TEAM_STATUS_CONFIG_DIR`: directory overrides.
//! - `TEAM_STATUS_LOG`: log filter (default `info`). Logs go to stderr.

use std::sync::Arc;

use team_status_core::{ConfigResolver, Credentials, ReportCache, ReportPipeline, SourceAggregator};

pub mod errors;
pub mod generators;
pub mod issues;
pub mod report;
pub mod server;
pub mod settings;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use errors::{Error, ServerResult};
pub use server::{serve, TeamStatusServer};
pub use settings::Settings;
pub use tools::{JiraAccess, ToolDispatcher, ToolRequest};

use generators::DefaultGeneratorFactory;

/// Builds the report pipeline described by `settings`.
pub fn build_pipeline(settings: &Settings) -> ReportPipeline {
    let factory = Arc::new(DefaultGeneratorFactory::new(settings.jira_auth));
    ReportPipeline::new(
        ReportCache::new(settings.reports_dir.clone()),
        ConfigResolver::new(settings.config_dir.clone()),
        SourceAggregator::new(factory).with_timeout(settings.source_timeout()),
    )
}

/// Wires the Jira client, report pipeline and tool dispatcher into a server.
pub fn build_server(settings: Settings, credentials: Credentials) -> TeamStatusServer {
    let jira = JiraAccess::connect(&credentials, settings.jira_auth);
    let pipeline = Arc::new(build_pipeline(&settings));
    TeamStatusServer::new(ToolDispatcher::new(jira, pipeline, credentials, settings))
}
