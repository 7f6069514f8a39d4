//! Server settings.
//!
//! Settings are read from an optional TOML file and then adjusted from the
//! environment. Every field has a default, so the server runs without a
//! settings file.
//!
//! ```toml
//! reports_dir = "Reports"
//! config_dir = "config"
//! source_timeout_secs = 300
//! default_max_results = 25
//! jira_auth = "bearer"
//! ```

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jira_client::JiraAuth;
use serde::Deserialize;
use team_status_core::credentials::{JIRA_API_TOKEN, JIRA_EMAIL, JIRA_SERVER};
use tracing::{debug, info};

use crate::errors::{Error, ServerResult};

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Settings file used when `TEAM_STATUS_CONFIG` is not set.
pub const DEFAULT_SETTINGS_FILENAME: &str = "team_status.toml";

pub const SETTINGS_PATH_VAR: &str = "TEAM_STATUS_CONFIG";
pub const REPORTS_DIR_VAR: &str = "TEAM_STATUS_REPORTS_DIR";
pub const CONFIG_DIR_VAR: &str = "TEAM_STATUS_CONFIG_DIR";

/// How the server authenticates against Jira.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JiraAuthMethod {
    /// `JIRA_API_TOKEN` is a personal access token.
    #[default]
    Bearer,
    /// `JIRA_EMAIL` and `JIRA_API_TOKEN` are sent as basic auth.
    Basic,
}

impl JiraAuthMethod {
    /// Environment variables the issue tools need for this method.
    pub fn required_variables(&self) -> &'static [&'static str] {
        match self {
            JiraAuthMethod::Bearer => &[JIRA_SERVER, JIRA_API_TOKEN],
            JiraAuthMethod::Basic => &[JIRA_SERVER, JIRA_EMAIL, JIRA_API_TOKEN],
        }
    }

    pub fn auth(&self, email: &str, api_token: &str) -> JiraAuth {
        match self {
            JiraAuthMethod::Bearer => JiraAuth::Bearer(api_token.to_string()),
            JiraAuthMethod::Basic => JiraAuth::Basic {
                email: email.to_string(),
                api_token: api_token.to_string(),
            },
        }
    }
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the generated weekly reports.
    pub reports_dir: PathBuf,
    /// Directory holding `jira_config.yaml`, `github_config.yaml` and `team_config.yaml`.
    pub config_dir: PathBuf,
    /// Per-source generation timeout. `0` disables the timeout.
    pub source_timeout_secs: u64,
    /// Result limit for the search tools when the caller gives none.
    /// Each tool has its own default when this is unset.
    pub default_max_results: Option<u32>,
    pub jira_auth: JiraAuthMethod,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("Reports"),
            config_dir: PathBuf::from("config"),
            source_timeout_secs: 300,
            default_max_results: None,
            jira_auth: JiraAuthMethod::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file. A missing file gives the defaults.
    ///
    /// # Errors
    /// Returns `Error::Settings` if the file cannot be read or contains invalid TOML.
    pub fn load(path: &Path) -> ServerResult<Self> {
        debug!("Loading settings from {:?}", path);

        let settings_error = |reason: String| Error::Settings {
            path: path.display().to_string(),
            reason,
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(settings_error(format!("Failed to read settings file: {e}"))),
        };

        toml::from_str(&content)
            .map_err(|e| settings_error(format!("Failed to parse settings file: {e}")))
    }

    /// Loads settings from `TEAM_STATUS_CONFIG` (or `team_status.toml`) and
    /// applies the directory overrides from the environment.
    pub fn from_env() -> ServerResult<Self> {
        let path = settings_path(env::var(SETTINGS_PATH_VAR).ok().as_deref());
        let mut settings = Self::load(&path)?;

        if let Some(dir) = non_empty_var(REPORTS_DIR_VAR) {
            settings.reports_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty_var(CONFIG_DIR_VAR) {
            settings.config_dir = PathBuf::from(dir);
        }

        info!(
            reports_dir = ?settings.reports_dir,
            config_dir = ?settings.config_dir,
            source_timeout_secs = settings.source_timeout_secs,
            "Loaded settings"
        );
        Ok(settings)
    }

    pub fn source_timeout(&self) -> Option<Duration> {
        (self.source_timeout_secs > 0).then(|| Duration::from_secs(self.source_timeout_secs))
    }

    /// The result limit for a search tool.
    pub fn max_results(&self, requested: Option<u32>, tool_default: u32) -> u32 {
        requested
            .or(self.default_max_results)
            .unwrap_or(tool_default)
    }
}

/// Resolves the settings file path, defaulting to the current directory.
pub fn settings_path(explicit: Option<&str>) -> PathBuf {
    match explicit.filter(|p| !p.trim().is_empty()) {
        Some(path) => PathBuf::from(path),
        None => env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_SETTINGS_FILENAME),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
