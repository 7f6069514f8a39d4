//! Weekly report orchestration.
//!
//! [`ReportPipeline::run`] takes one request through window validation, the
//! report cache, credential checks, configuration resolution, source
//! aggregation, summary enrichment and persistence, in that order.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::cache::ReportCache;
use crate::config::{apply_overrides, ConfigMap, ConfigResolver};
use crate::credentials::Credentials;
use crate::errors::ReportResult;
use crate::sources::{combine, SourceAggregator};
use crate::summary::SummaryEnricher;
use crate::window::ReportingWindow;

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Caller parameters for one weekly report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    /// Wednesday the window starts on, `YYYY-MM-DD`. Defaults to today.
    pub start_date: Option<String>,
    /// Tuesday the window ends on, `YYYY-MM-DD`. Defaults to seven days before the start.
    pub end_date: Option<String>,
    /// Overrides the `GITHUB_TOKEN` environment variable.
    pub github_token: Option<String>,
    /// Ignore a stored report for the window and generate a new one.
    pub regenerate: bool,
    pub generate_summary: bool,
    pub summary_prompt: Option<String>,
    /// Per-source configuration fragments keyed by `jira`, `github` or `team`.
    pub config_overrides: Option<ConfigMap>,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            github_token: None,
            regenerate: false,
            generate_summary: true,
            summary_prompt: None,
            config_overrides: None,
        }
    }
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// A stored report for the window was returned as is.
    Cached {
        window: ReportingWindow,
        path: PathBuf,
        content: String,
    },
    /// A new report was generated and saved.
    Generated {
        window: ReportingWindow,
        path: PathBuf,
        content: String,
        /// Length of `content` in characters.
        size: usize,
    },
}

impl ReportOutcome {
    pub fn window(&self) -> &ReportingWindow {
        match self {
            ReportOutcome::Cached { window, .. } | ReportOutcome::Generated { window, .. } => {
                window
            }
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            ReportOutcome::Cached { path, .. } | ReportOutcome::Generated { path, .. } => path,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ReportOutcome::Cached { content, .. } | ReportOutcome::Generated { content, .. } => {
                content
            }
        }
    }
}

/// Produces weekly status reports.
#[derive(Clone)]
pub struct ReportPipeline {
    cache: ReportCache,
    resolver: ConfigResolver,
    aggregator: SourceAggregator,
    clock: Arc<dyn Clock>,
}

impl ReportPipeline {
    pub fn new(cache: ReportCache, resolver: ConfigResolver, aggregator: SourceAggregator) -> Self {
        Self {
            cache,
            resolver,
            aggregator,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Produce the report for the requested window.
    ///
    /// # Errors
    /// - `InvalidWindow` when a supplied date is malformed or on the wrong weekday.
    /// - `MissingCredentials` when no stored report exists and credentials are incomplete.
    /// - `ConfigMaterialization` when an override cannot be written for a generator.
    /// - `Storage` when the report cannot be saved. The error carries the report text.
    ///
    /// Source failures are not errors; they appear inline in the report.
    #[instrument(skip(self, request, credentials), fields(regenerate = request.regenerate))]
    pub async fn run(
        &self,
        request: &ReportRequest,
        credentials: &Credentials,
    ) -> ReportResult<ReportOutcome> {
        // Step 1: Validate the reporting window
        let window = ReportingWindow::resolve(
            request.start_date.as_deref(),
            request.end_date.as_deref(),
            self.clock.today(),
        )
        .map_err(|e| {
            error!("Invalid reporting window: {}", e);
            e
        })?;

        info!("Generating weekly report for {}", window);

        // Step 2: Return a stored report unless regeneration was requested
        if !request.regenerate {
            if let Some(content) = self.cache.exists(&window) {
                let path = self.cache.locate(&window)?;
                info!("Found existing report: {:?}", path);
                return Ok(ReportOutcome::Cached {
                    window,
                    path,
                    content,
                });
            }
        }

        // Step 3: Check credentials before touching any source
        let credentials = credentials
            .clone()
            .with_github_token(request.github_token.as_deref())
            .validate()
            .map_err(|e| {
                error!("{}", e);
                e
            })?;

        // Step 4: Resolve configuration
        let overrides = request.config_overrides.as_ref();
        let effective = apply_overrides(self.resolver.load_base(), overrides);
        debug!("Effective config sources: {:?}", effective.source_names().collect::<Vec<_>>());

        let config_files = self.resolver.resolve_source_files(overrides).map_err(|e| {
            error!("Failed to prepare source configuration: {}", e);
            e
        })?;

        // Step 5: Generate both source sections
        let gathered = self
            .aggregator
            .gather(
                &window,
                config_files.jira(),
                config_files.github(),
                &credentials,
            )
            .await;
        drop(config_files);

        // Step 6: Combine and enrich
        let combined = combine(&window, &gathered.jira, &gathered.github, self.clock.now());
        let report = SummaryEnricher::new(request.generate_summary, request.summary_prompt.clone())
            .enrich(&combined);

        // Step 7: Persist
        let path = self.cache.write(&window, &report).map_err(|e| {
            error!("Failed to save report: {}", e);
            e
        })?;

        info!("Weekly report generated: {:?}", path);

        Ok(ReportOutcome::Generated {
            window,
            path,
            size: report.chars().count(),
            content: report,
        })
    }
}
