//! Report pipeline error types.
//!
//! Domain-specific errors for window validation, credential checks,
//! configuration handling and report persistence.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while deriving a reporting window from caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    UnparsableDate { field: String, value: String },

    #[error("{field} must be a {expected}. {date} is a {actual}")]
    WrongWeekday {
        field: String,
        date: String,
        expected: String,
        actual: String,
    },

    /// The default end date would fall before the earliest representable date.
    #[error("{field} {date} is too early to derive a reporting window")]
    OutOfRange { field: String, date: String },
}

/// Errors raised while filling a summary prompt template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown placeholder '{{{name}}}' in summary template")]
    UnknownPlaceholder { name: String },

    #[error("Unbalanced '{brace}' at position {position} in summary template")]
    UnbalancedBrace { brace: char, position: usize },
}

/// Report pipeline errors.
///
/// Only some of these end a pipeline run. `SourceGeneration` and `ConfigLoad`
/// are recoverable: the pipeline embeds or logs them and carries on. The
/// remaining variants are returned to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("{0}")]
    InvalidWindow(#[from] WindowError),

    #[error("Missing required credentials: {}", missing.join(", "))]
    MissingCredentials { missing: Vec<String> },

    #[error("Error generating {source_name} report: {reason}")]
    SourceGeneration { source_name: String, reason: String },

    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },

    #[error("Failed to write temporary configuration file: {reason}")]
    ConfigMaterialization { reason: String },

    /// The report could not be persisted. The generated text is kept so the
    /// caller still receives it.
    #[error("Failed to save report: {reason}")]
    Storage {
        path: String,
        reason: String,
        report: String,
    },
}

impl ReportError {
    pub fn missing_credentials<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingCredentials {
            missing: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn source_generation(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceGeneration {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for report pipeline operations.
pub type ReportResult<T> = Result<T, ReportError>;
