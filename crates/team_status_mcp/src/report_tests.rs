use super::*;
use chrono::NaiveDate;
use std::path::PathBuf;
use team_status_core::{ReportingWindow, WindowError};

fn window() -> ReportingWindow {
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    ReportingWindow::resolve(None, None, today).unwrap()
}

#[test]
fn test_render_cached_report() {
    let text = render(Ok(ReportOutcome::Cached {
        window: window(),
        path: PathBuf::from("Reports/Weekly_Report_2024-01-10_to_2024-01-03.md"),
        content: "# Weekly Team Status Report\n".to_string(),
    }));

    assert_eq!(
        text,
        "**Found existing report (use regenerate=true to recreate):**\n\n\
         **File:** Reports/Weekly_Report_2024-01-10_to_2024-01-03.md\n\n---\n\n\
         # Weekly Team Status Report\n"
    );
}

#[test]
fn test_render_generated_report() {
    let text = render(Ok(ReportOutcome::Generated {
        window: window(),
        path: PathBuf::from("Reports/Weekly_Report_2024-01-10_to_2024-01-03.md"),
        content: "body".to_string(),
        size: 4,
    }));

    assert_eq!(
        text,
        "**Weekly status report generated successfully!**\n\n\
         **Period:** 2024-01-10 to 2024-01-03\n\
         **File:** Reports/Weekly_Report_2024-01-10_to_2024-01-03.md\n\
         **Size:** 4 characters\n\n---\n\nbody"
    );
}

#[test]
fn test_render_invalid_window() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let err: WindowError = ReportingWindow::resolve(Some("2024-01-11"), None, today).unwrap_err();

    let text = render(Err(err.into()));

    assert_eq!(
        text,
        "Error: start_date must be a Wednesday. 2024-01-11 is a Thursday"
    );
}

#[test]
fn test_render_missing_credentials() {
    let text = render(Err(ReportError::missing_credentials([
        "JIRA_EMAIL",
        "GITHUB_TOKEN",
    ])));

    assert_eq!(
        text,
        "Error: Missing required credentials: JIRA_EMAIL, GITHUB_TOKEN\n\n\
         Please set these environment variables in your .env file or pass github_token as a parameter."
    );
}

#[test]
fn test_render_storage_error_keeps_report() {
    let text = render(Err(ReportError::Storage {
        path: "Reports/x.md".to_string(),
        reason: "Permission denied".to_string(),
        report: "# Weekly Team Status Report".to_string(),
    }));

    assert_eq!(
        text,
        "Error: Failed to save report: Permission denied\n\nReport content:\n\n# Weekly Team Status Report"
    );
}

#[test]
fn test_render_other_errors_use_display() {
    let text = render(Err(ReportError::ConfigMaterialization {
        reason: "disk full".to_string(),
    }));

    assert_eq!(
        text,
        "Error: Failed to write temporary configuration file: disk full"
    );
}
