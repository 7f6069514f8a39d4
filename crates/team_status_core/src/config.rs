//! Layered report configuration.
//!
//! Each report source (`jira`, `github`, `team`) has a YAML document in the
//! configuration directory. Callers may supply an override fragment per source,
//! which is merged onto the stored defaults before the source's generator runs.
//!
//! # Merge layers
//!
//! Two merge rules exist and they are deliberately different:
//!
//! - [`apply_overrides`] builds the [`EffectiveConfig`] for a run. It merges one
//!   level deep: top-level keys of a source's override replace the same keys of
//!   the stored document wholesale.
//! - [`deep_merge`] (used by [`merge_source_with_defaults`]) builds the document
//!   handed to a generator. Nested mappings are merged recursively; scalars,
//!   lists and type mismatches are replaced, never concatenated.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use team_status_core::config::{deep_merge, ConfigMap};
//!
//! let mut base: ConfigMap = serde_json::from_value(json!({
//!     "filters": { "status": "Done", "team": "core" },
//!     "labels": ["a", "b"]
//! })).unwrap();
//! let overrides: ConfigMap = serde_json::from_value(json!({
//!     "filters": { "status": "Open" },
//!     "labels": ["c"]
//! })).unwrap();
//!
//! deep_merge(&mut base, &overrides);
//! assert_eq!(base["filters"]["team"], "core");
//! assert_eq!(base["filters"]["status"], "Open");
//! assert_eq!(base["labels"], json!(["c"]));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{ReportError, ReportResult};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// A configuration document: string keys mapped to arbitrary nested values.
pub type ConfigMap = serde_json::Map<String, Value>;

/// The named configuration sources known to the report pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceName {
    Jira,
    Github,
    Team,
}

impl SourceName {
    pub const ALL: [SourceName; 3] = [SourceName::Jira, SourceName::Github, SourceName::Team];

    /// Key used for this source in override fragments and the effective config.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Jira => "jira",
            SourceName::Github => "github",
            SourceName::Team => "team",
        }
    }

    /// Human-readable name used in report text.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceName::Jira => "Jira",
            SourceName::Github => "GitHub",
            SourceName::Team => "Team",
        }
    }

    /// File name of the stored defaults for this source.
    pub fn file_name(&self) -> String {
        format!("{}_config.yaml", self.as_str())
    }

    /// Prefix for transient files holding this source's merged configuration.
    pub fn temp_prefix(&self) -> String {
        format!("{}_mcp_", self.as_str())
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-source configuration in effect for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveConfig {
    sources: BTreeMap<String, Value>,
}

impl EffectiveConfig {
    /// An effective config with an empty mapping for every known source.
    pub fn empty() -> Self {
        let sources = SourceName::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), Value::Object(ConfigMap::new())))
            .collect();
        Self { sources }
    }

    pub fn get(&self, source: &str) -> Option<&Value> {
        self.sources.get(source)
    }

    pub fn set(&mut self, source: impl Into<String>, value: Value) {
        self.sources.insert(source.into(), value);
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

/// Recursively merge `overrides` onto `base`.
///
/// When both sides hold a mapping at the same key the mappings are merged;
/// in every other case the override value replaces the base value.
pub fn deep_merge(base: &mut ConfigMap, overrides: &ConfigMap) {
    for (key, value) in overrides {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(update)) => deep_merge(existing, update),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Apply caller overrides to the base configuration, one level deep.
///
/// Keys already present in `base` are updated: when both values are mappings
/// the override's top-level keys are copied over, otherwise the value is
/// replaced. Unknown keys are inserted verbatim.
pub fn apply_overrides(mut base: EffectiveConfig, overrides: Option<&ConfigMap>) -> EffectiveConfig {
    let Some(overrides) = overrides.filter(|o| !o.is_empty()) else {
        return base;
    };

    for (key, value) in overrides {
        match (base.sources.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(update)) => {
                for (k, v) in update {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                base.sources.insert(key.clone(), value.clone());
            }
        }
    }

    info!(
        keys = ?overrides.keys().collect::<Vec<_>>(),
        "Applied config overrides"
    );
    base
}

/// Load the defaults at `default_location` and deep-merge the caller's
/// override fragment for `source` onto them.
///
/// A missing or unreadable defaults file yields an empty base. An override
/// that is not a mapping is ignored.
pub fn merge_source_with_defaults(
    overrides: Option<&ConfigMap>,
    default_location: &Path,
    source: &str,
) -> ConfigMap {
    let mut config = if default_location.exists() {
        match load_config_document(default_location) {
            Ok(map) => {
                info!(path = ?default_location, "Loaded default config");
                map
            }
            Err(e) => {
                warn!(path = ?default_location, error = %e, "Could not load default config");
                ConfigMap::new()
            }
        }
    } else {
        ConfigMap::new()
    };

    if let Some(Value::Object(update)) = overrides.and_then(|o| o.get(source)) {
        deep_merge(&mut config, update);
        info!(source = source, "Applied config overrides");
    }

    config
}

/// Read a YAML configuration document into a mapping.
///
/// Empty documents load as an empty mapping.
///
/// # Errors
/// Returns `ReportError::ConfigLoad` if the file cannot be read, is not valid
/// YAML, or its top level is not a mapping.
pub fn load_config_document(path: &Path) -> ReportResult<ConfigMap> {
    let load_error = |reason: String| ReportError::ConfigLoad {
        path: path.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    if content.trim().is_empty() {
        return Ok(ConfigMap::new());
    }

    let value: Value = serde_yaml::from_str(&content).map_err(|e| load_error(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ConfigMap::new()),
        other => Err(load_error(format!(
            "expected a mapping at the top level, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// A configuration document written to a uniquely named transient file.
///
/// The file is removed when the guard is dropped, on every exit path. Removal
/// failures are logged and never propagated.
#[derive(Debug)]
pub struct TempConfigFile {
    path: PathBuf,
}

impl TempConfigFile {
    fn create(map: &ConfigMap, prefix: &str, dir: Option<&Path>) -> ReportResult<Self> {
        let materialize_error = |reason: String| ReportError::ConfigMaterialization { reason };

        let yaml = serde_yaml::to_string(map).map_err(|e| materialize_error(e.to_string()))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".yaml");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| materialize_error(e.to_string()))?;

        file.write_all(yaml.as_bytes())
            .map_err(|e| materialize_error(e.to_string()))?;

        let (_, path) = file
            .keep()
            .map_err(|e| materialize_error(e.error.to_string()))?;

        info!(path = ?path, "Created temporary config file");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempConfigFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = ?self.path, "Cleaned up temp config file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "Temp config file already removed")
            }
            Err(e) => warn!(path = ?self.path, error = %e, "Could not delete temp file"),
        }
    }
}

/// The configuration file each generator should read for one run.
///
/// Holds the guards of any transient files so they live exactly as long as
/// this value. Dropping it removes them.
#[derive(Debug)]
pub struct ResolvedConfigFiles {
    jira: PathBuf,
    github: PathBuf,
    temp_files: Vec<TempConfigFile>,
}

impl ResolvedConfigFiles {
    pub fn jira(&self) -> &Path {
        &self.jira
    }

    pub fn github(&self) -> &Path {
        &self.github
    }

    /// Number of transient files held by this value.
    pub fn temp_file_count(&self) -> usize {
        self.temp_files.len()
    }
}

/// Loads stored configuration and resolves per-run overrides.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config_dir: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            temp_dir: None,
        }
    }

    /// Write transient configuration files into `dir` instead of the system
    /// temporary directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Location of the stored defaults for `source`.
    pub fn location(&self, source: SourceName) -> PathBuf {
        self.config_dir.join(source.file_name())
    }

    /// Load the stored document of every source.
    ///
    /// A source whose file is absent, unreadable or unparsable gets an empty
    /// mapping; failures are logged.
    pub fn load_base(&self) -> EffectiveConfig {
        let mut config = EffectiveConfig::empty();

        for source in SourceName::ALL {
            let path = self.location(source);
            if !path.exists() {
                debug!(source = %source, path = ?path, "No config file for source");
                continue;
            }

            match load_config_document(&path) {
                Ok(map) => {
                    info!(source = %source, path = ?path, "Loaded config");
                    config.set(source.as_str(), Value::Object(map));
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "Failed to load config");
                }
            }
        }

        config
    }

    /// Serialize `map` to a uniquely named transient YAML file.
    ///
    /// # Errors
    /// Returns `ReportError::ConfigMaterialization` if the file cannot be written.
    pub fn materialize_temp(&self, map: &ConfigMap, prefix: &str) -> ReportResult<TempConfigFile> {
        TempConfigFile::create(map, prefix, self.temp_dir.as_deref())
    }

    /// Decide which file each generator reads.
    ///
    /// Without an override for a source its stored defaults location is used
    /// unchanged. With a mapping override the merged document is written to a
    /// transient file, unless the merge produced an empty document.
    pub fn resolve_source_files(
        &self,
        overrides: Option<&ConfigMap>,
    ) -> ReportResult<ResolvedConfigFiles> {
        let mut resolved = ResolvedConfigFiles {
            jira: self.location(SourceName::Jira),
            github: self.location(SourceName::Github),
            temp_files: Vec::new(),
        };

        let Some(overrides) = overrides.filter(|o| !o.is_empty()) else {
            return Ok(resolved);
        };

        for source in [SourceName::Jira, SourceName::Github] {
            if !matches!(overrides.get(source.as_str()), Some(Value::Object(_))) {
                continue;
            }

            let default_location = self.location(source);
            let merged =
                merge_source_with_defaults(Some(overrides), &default_location, source.as_str());
            if merged.is_empty() {
                continue;
            }

            let temp = self.materialize_temp(&merged, &source.temp_prefix())?;
            let path = temp.path().to_path_buf();
            resolved.temp_files.push(temp);

            match source {
                SourceName::Jira => resolved.jira = path,
                SourceName::Github => resolved.github = path,
                SourceName::Team => {}
            }
        }

        Ok(resolved)
    }
}
