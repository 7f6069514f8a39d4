//! Jira issue tool handlers.
//!
//! Each handler calls the tracker and renders the answer as markdown text.
//! Errors are rendered into the text as well, prefixed with what was being
//! attempted.

use std::fmt::Write as _;

use jira_client::models::{Issue, IssueKey, IssueUpdate, NewIssue, ProjectKey, TransitionOutcome};
use jira_client::IssueTracker;
use tracing::{error, info};

use crate::tools::{CreateIssueParams, DEFAULT_PRIORITY};

#[cfg(test)]
#[path = "issues_tests.rs"]
mod tests;

/// Logs a failed tool call and renders its message.
fn failure(context: String, e: impl std::fmt::Display) -> String {
    error!(error = %e, "{context}");
    format!("{context}: {e}")
}

pub async fn get_issue(tracker: &dyn IssueTracker, issue_key: &str) -> String {
    let context = format!("Error fetching issue {issue_key}");
    let key = match IssueKey::new(issue_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.get_issue(&key).await {
        Ok(issue) => format!(
            "**Issue: {key}**\n\n\
             **Summary:** {summary}\n\
             **Status:** {status}\n\
             **Priority:** {priority}\n\
             **Assignee:** {assignee}\n\
             **Reporter:** {reporter}\n\
             **Type:** {issue_type}\n\
             **Project:** {project}\n\
             **Created:** {created}\n\
             **Updated:** {updated}\n\
             **URL:** {url}\n\n\
             **Description:**\n{description}",
            key = issue.key,
            summary = issue.fields.summary,
            status = issue.status_name(),
            priority = issue.priority_name(),
            assignee = issue.assignee_name(),
            reporter = issue.reporter_name(),
            issue_type = issue.issue_type_name(),
            project = issue.project_name(),
            created = issue.fields.created.as_deref().unwrap_or("None"),
            updated = issue.fields.updated.as_deref().unwrap_or("None"),
            url = tracker.browse_url(&issue.key),
            description = issue.description(),
        ),
        Err(e) => failure(context, e),
    }
}

/// Which detail follows the status on each line of an issue list.
#[derive(Debug, Clone, Copy)]
enum ListDetail {
    Assignee,
    Priority,
}

fn render_issue_list(
    out: &mut String,
    tracker: &dyn IssueTracker,
    issues: &[Issue],
    detail: ListDetail,
) {
    for issue in issues {
        let detail = match detail {
            ListDetail::Assignee => format!("Assignee: {}", issue.assignee_name()),
            ListDetail::Priority => format!("Priority: {}", issue.priority_name()),
        };
        let _ = write!(
            out,
            "• **{key}** - {summary}\n  Status: {status} | {detail}\n  URL: {url}\n\n",
            key = issue.key,
            summary = issue.fields.summary,
            status = issue.status_name(),
            url = tracker.browse_url(&issue.key),
        );
    }
}

pub async fn search_issues(tracker: &dyn IssueTracker, jql: &str, max_results: u32) -> String {
    match tracker.search_issues(jql, max_results).await {
        Ok(issues) if issues.is_empty() => "No issues found matching the query.".to_string(),
        Ok(issues) => {
            let mut text = format!("**Found {} issue(s):**\n\n", issues.len());
            render_issue_list(&mut text, tracker, &issues, ListDetail::Assignee);
            text
        }
        Err(e) => failure("Error searching issues".to_string(), e),
    }
}

pub async fn create_issue(tracker: &dyn IssueTracker, params: CreateIssueParams) -> String {
    let context = "Error creating issue".to_string();
    let project_key = match ProjectKey::new(params.project_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    let priority = params
        .priority
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
    let due_date = params.due_date.filter(|d| !d.trim().is_empty());

    let new_issue = NewIssue {
        project_key,
        issue_type: params.issue_type,
        summary: params.summary,
        description: params.description,
        priority: Some(priority.clone()),
        due_date: due_date.clone(),
    };

    match tracker.create_issue(&new_issue).await {
        Ok(created) => {
            info!(key = %created.key, "Issue created");
            let due_date_text = due_date
                .map(|d| format!("\n**Due Date:** {d}"))
                .unwrap_or_default();
            format!(
                "**Issue created successfully!**\n\n\
                 **Key:** {key}\n\
                 **Summary:** {summary}\n\
                 **Type:** {issue_type}\n\
                 **Priority:** {priority}{due_date_text}\n\
                 **URL:** {url}",
                key = created.key,
                summary = new_issue.summary,
                issue_type = new_issue.issue_type,
                url = tracker.browse_url(&created.key),
            )
        }
        Err(e) => failure(context, e),
    }
}

pub async fn update_issue(
    tracker: &dyn IssueTracker,
    issue_key: &str,
    summary: Option<String>,
    description: Option<String>,
) -> String {
    let context = format!("Error updating issue {issue_key}");
    let key = match IssueKey::new(issue_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    let update = IssueUpdate {
        summary: summary.filter(|s| !s.is_empty()),
        description: description.filter(|d| !d.is_empty()),
    };
    if update.is_empty() {
        return "No fields specified for update.".to_string();
    }

    if let Err(e) = tracker.update_issue(&key, &update).await {
        return failure(context, e);
    }

    let mut updates = Vec::new();
    if let Some(summary) = &update.summary {
        updates.push(format!("Summary: {summary}"));
    }
    if update.description.is_some() {
        updates.push("Description updated".to_string());
    }

    format!(
        "**Issue {key} updated successfully!**\n\n\
         **Updated fields:** {}\n\
         **URL:** {}",
        updates.join(", "),
        tracker.browse_url(key.as_str()),
    )
}

pub async fn add_comment(tracker: &dyn IssueTracker, issue_key: &str, comment: &str) -> String {
    let context = format!("Error adding comment to {issue_key}");
    let key = match IssueKey::new(issue_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.add_comment(&key, comment).await {
        Ok(_) => format!(
            "**Comment added to {key} successfully!**\n\n\
             **Comment:** {comment}\n\
             **URL:** {}",
            tracker.browse_url(key.as_str()),
        ),
        Err(e) => failure(context, e),
    }
}

pub async fn get_comments(tracker: &dyn IssueTracker, issue_key: &str) -> String {
    let context = format!("Error fetching comments for {issue_key}");
    let key = match IssueKey::new(issue_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.get_comments(&key).await {
        Ok(comments) if comments.is_empty() => format!("No comments found for issue {key}."),
        Ok(comments) => {
            let mut text = format!("**Comments for {key}:**\n\n");
            for comment in &comments {
                let _ = write!(
                    text,
                    "**{}** - {}\n{}\n---\n\n",
                    comment.author_name(),
                    comment.created.as_deref().unwrap_or("None"),
                    comment.body
                );
            }
            text
        }
        Err(e) => failure(context, e),
    }
}

pub async fn transition_issue(
    tracker: &dyn IssueTracker,
    issue_key: &str,
    transition_name: &str,
) -> String {
    let context = format!("Error transitioning issue {issue_key}");
    let key = match IssueKey::new(issue_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.transition_issue(&key, transition_name).await {
        Ok(TransitionOutcome::Applied { new_status }) => format!(
            "**Issue {key} transitioned successfully!**\n\n\
             **New Status:** {new_status}\n\
             **URL:** {}",
            tracker.browse_url(key.as_str()),
        ),
        Ok(TransitionOutcome::NotAvailable { available }) => format!(
            "Transition '{transition_name}' not found for issue {key}.\n\n\
             Available transitions: {}",
            available.join(", ")
        ),
        Err(e) => failure(context, e),
    }
}

pub async fn get_project(tracker: &dyn IssueTracker, project_key: &str) -> String {
    let context = format!("Error fetching project {project_key}");
    let key = match ProjectKey::new(project_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.get_project(&key).await {
        Ok(project) => format!(
            "**Project: {key}**\n\n\
             **Name:** {name}\n\
             **Lead:** {lead}\n\
             **Type:** {project_type}\n\
             **URL:** {url}\n\n\
             **Description:**\n{description}",
            key = project.key,
            name = project.name,
            lead = project
                .lead
                .as_ref()
                .map(|l| l.display_name.as_str())
                .unwrap_or("No lead"),
            project_type = project.project_type_key.as_deref().unwrap_or("Unknown"),
            url = tracker.project_url(&project.key),
            description = project
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description"),
        ),
        Err(e) => failure(context, e),
    }
}

pub async fn get_issue_types(tracker: &dyn IssueTracker, project_key: &str) -> String {
    let context = format!("Error fetching issue types for {project_key}");
    let key = match ProjectKey::new(project_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.get_issue_types(&key).await {
        Ok(types) if types.is_empty() => format!("No issue types found for project {key}."),
        Ok(types) => {
            let mut text = format!("**Issue types for project {key}:**\n\n");
            for issue_type in &types {
                let _ = write!(text, "• **{}**", issue_type.name);
                if let Some(description) = issue_type.description.as_deref().filter(|d| !d.is_empty()) {
                    let _ = write!(text, " - {description}");
                }
                text.push('\n');
            }
            text
        }
        Err(e) => failure(context, e),
    }
}

pub async fn get_my_issues(tracker: &dyn IssueTracker, max_results: u32) -> String {
    match tracker.get_my_issues(max_results).await {
        Ok(issues) if issues.is_empty() => "No issues assigned to you found.".to_string(),
        Ok(issues) => {
            let mut text = format!("**Your assigned issues ({}):**\n\n", issues.len());
            render_issue_list(&mut text, tracker, &issues, ListDetail::Priority);
            text
        }
        Err(e) => failure("Error fetching your issues".to_string(), e),
    }
}

pub async fn get_project_issues(
    tracker: &dyn IssueTracker,
    project_key: &str,
    max_results: u32,
) -> String {
    let context = "Error fetching project issues".to_string();
    let key = match ProjectKey::new(project_key) {
        Ok(key) => key,
        Err(e) => return failure(context, e),
    };

    match tracker.get_project_issues(&key, max_results).await {
        Ok(issues) if issues.is_empty() => format!("No issues found for project {key}."),
        Ok(issues) => {
            let mut text = format!("**Issues in project {key} ({}):**\n\n", issues.len());
            render_issue_list(&mut text, tracker, &issues, ListDetail::Assignee);
            text
        }
        Err(e) => failure(context, e),
    }
}
