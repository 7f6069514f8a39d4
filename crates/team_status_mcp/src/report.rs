//! Text answers for `generate_weekly_status`.

use team_status_core::{ReportError, ReportOutcome, ReportResult};
use tracing::error;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

/// Renders a pipeline result as the tool's text answer.
pub fn render(result: ReportResult<ReportOutcome>) -> String {
    match result {
        Ok(ReportOutcome::Cached { path, content, .. }) => format!(
            "**Found existing report (use regenerate=true to recreate):**\n\n\
             **File:** {}\n\n---\n\n{content}",
            path.display()
        ),
        Ok(ReportOutcome::Generated {
            window,
            path,
            content,
            size,
        }) => format!(
            "**Weekly status report generated successfully!**\n\n\
             **Period:** {} to {}\n\
             **File:** {}\n\
             **Size:** {size} characters\n\n---\n\n{content}",
            window.start_str(),
            window.end_str(),
            path.display()
        ),
        Err(e) => {
            error!(error = %e, "Weekly status report failed");
            render_error(e)
        }
    }
}

fn render_error(e: ReportError) -> String {
    match e {
        ReportError::MissingCredentials { missing } => format!(
            "Error: Missing required credentials: {}\n\n\
             Please set these environment variables in your .env file or pass github_token as a parameter.",
            missing.join(", ")
        ),
        ReportError::Storage { reason, report, .. } => format!(
            "Error: Failed to save report: {reason}\n\nReport content:\n\n{report}"
        ),
        other => format!("Error: {other}"),
    }
}
