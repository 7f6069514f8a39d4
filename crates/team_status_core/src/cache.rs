//! Report persistence keyed by reporting window.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{ReportError, ReportResult};
use crate::window::ReportingWindow;

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

/// Stores one markdown file per reporting window in a single directory.
#[derive(Debug, Clone)]
pub struct ReportCache {
    reports_dir: PathBuf,
}

impl ReportCache {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    /// File name of the report for `window`.
    pub fn file_name(window: &ReportingWindow) -> String {
        format!(
            "Weekly_Report_{}_to_{}.md",
            window.start_str(),
            window.end_str()
        )
    }

    /// Path of the report for `window`, creating the reports directory if needed.
    ///
    /// # Errors
    /// Returns `ReportError::Storage` if the directory cannot be created.
    pub fn locate(&self, window: &ReportingWindow) -> ReportResult<PathBuf> {
        fs::create_dir_all(&self.reports_dir).map_err(|e| ReportError::Storage {
            path: self.reports_dir.display().to_string(),
            reason: e.to_string(),
            report: String::new(),
        })?;

        Ok(self.reports_dir.join(Self::file_name(window)))
    }

    /// Return the stored report for `window`, if one exists.
    ///
    /// An unreadable or empty file is treated as absent so the report is
    /// regenerated.
    pub fn exists(&self, window: &ReportingWindow) -> Option<String> {
        let path = self.reports_dir.join(Self::file_name(window));

        match fs::read_to_string(&path) {
            Ok(content) if content.is_empty() => {
                debug!(path = ?path, "Ignoring empty cached report");
                None
            }
            Ok(content) => {
                debug!(path = ?path, "Found cached report");
                Some(content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = ?path, error = %e, "Error reading existing report");
                None
            }
        }
    }

    /// Persist `content` as the report for `window`, replacing any previous file.
    ///
    /// # Errors
    /// Returns `ReportError::Storage` carrying the unsaved content.
    pub fn write(&self, window: &ReportingWindow, content: &str) -> ReportResult<PathBuf> {
        let storage_error = |path: &Path, reason: String| ReportError::Storage {
            path: path.display().to_string(),
            reason,
            report: content.to_string(),
        };

        let path = self
            .locate(window)
            .map_err(|e| storage_error(&self.reports_dir, e.to_string()))?;

        fs::write(&path, content).map_err(|e| storage_error(&path, e.to_string()))?;

        info!(path = ?path, size = content.chars().count(), "Report saved");
        Ok(path)
    }
}
