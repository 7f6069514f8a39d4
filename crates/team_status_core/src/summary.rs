//! Executive summary instructions.
//!
//! The pipeline never calls a language model. When enabled it appends a
//! section holding a prompt, with the combined report filled in, for the
//! invoking agent to act on.

use tracing::{info, warn};

use crate::errors::TemplateError;

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;

/// Name of the only placeholder a summary template may use.
pub const REPORT_PLACEHOLDER: &str = "report_content";

/// Template used when the caller does not supply one.
pub const DEFAULT_SUMMARY_PROMPT: &str = "Based on the following weekly team report, generate an executive summary highlighting:

1. Key Accomplishments: Major milestones and completed work
2. Team Velocity: Overall productivity and throughput metrics
3. Blockers & Risks: Issues requiring attention or escalation
4. Notable Trends: Patterns in team performance or workload

Keep the summary concise (3-5 paragraphs) and action-oriented.

---

{report_content}

---

Please provide the executive summary:";

/// Replace every `{report_content}` in `template` with `content`.
///
/// `{{` and `}}` produce literal braces.
///
/// # Errors
/// Returns `TemplateError` for any other placeholder name or an unmatched brace.
pub fn fill_template(template: &str, content: &str) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len() + content.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                output.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => {
                            return Err(TemplateError::UnbalancedBrace {
                                brace: '{',
                                position,
                            })
                        }
                        Some((_, ch)) => name.push(ch),
                    }
                }

                if name != REPORT_PLACEHOLDER {
                    return Err(TemplateError::UnknownPlaceholder { name });
                }
                output.push_str(content);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                output.push('}');
            }
            '}' => {
                return Err(TemplateError::UnbalancedBrace {
                    brace: '}',
                    position,
                })
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

/// Appends the executive summary section to a combined report.
#[derive(Debug, Clone, Default)]
pub struct SummaryEnricher {
    enabled: bool,
    template: Option<String>,
}

impl SummaryEnricher {
    pub fn new(enabled: bool, template: Option<String>) -> Self {
        Self { enabled, template }
    }

    /// Return `combined` with the summary section appended, or unchanged when
    /// disabled or when the template cannot be filled.
    pub fn enrich(&self, combined: &str) -> String {
        if !self.enabled {
            return combined.to_string();
        }

        let template = self
            .template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_SUMMARY_PROMPT);

        match fill_template(template, combined) {
            Ok(prompt) => {
                info!("Added executive summary instructions");
                format!(
                    "{combined}\n\n---\n\n## Executive Summary\n\n\
                     > **Note:** To generate an AI-powered executive summary, \
                     process the above report with the following prompt:\n\n\
                     {prompt}\n\n"
                )
            }
            Err(e) => {
                warn!(error = %e, "Failed to add summary section");
                combined.to_string()
            }
        }
    }
}
