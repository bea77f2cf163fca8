//! LLM summaries for tickets and upstream fixes.

/// Gemini `generateContent` client implementation.
pub mod gemini;

/// Common trait for summarizers.
pub mod traits;

use serde::{Deserialize, Serialize};

/// Selects the prompt wording for a summary request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    /// A ticket from this project's own tracker.
    Ticket,
    /// A bug fixed by the upstream project.
    UpstreamFix,
}

impl StyleHint {
    fn intro(&self) -> &'static str {
        match self {
            StyleHint::Ticket => {
                "Generate a concise, user-friendly summary for a software release note based on the following ticket details. The summary should be a single, clear sentence explaining the change from an end-user's perspective."
            }
            StyleHint::UpstreamFix => {
                "Generate a concise, user-friendly summary for an upstream bug fix. The summary should be a single, clear sentence explaining the fix from an end-user's perspective."
            }
        }
    }
}

/// Raw text handed to the summarizer for a ticket or bug page: the title and
/// description lines that are non-empty. Empty when both are blank.
pub fn raw_text(title: &str, description: &str) -> String {
    let mut lines = vec![];

    if !title.trim().is_empty() {
        lines.push(format!("Original title: \"{}\"", title.trim()));
    }

    if !description.trim().is_empty() {
        lines.push(format!("Description: \"{}\"", description.trim()));
    }

    lines.join("\n")
}

/// Full prompt sent to the LLM.
pub fn build_prompt(raw_text: &str, style: StyleHint) -> String {
    format!(
        "{} Do not start with phrases like \"This ticket\" or \"The user can now\". Just state the change directly.\n{}\nRelease Note Summary:",
        style.intro(),
        raw_text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_skips_blank_parts() {
        assert_eq!(raw_text("Fix crash", ""), "Original title: \"Fix crash\"");
        assert_eq!(
            raw_text("Fix crash", "It crashed."),
            "Original title: \"Fix crash\"\nDescription: \"It crashed.\""
        );
        assert_eq!(raw_text("  ", "\n"), "");
    }

    #[test]
    fn prompt_depends_on_style() {
        let ticket = build_prompt("Original title: \"x\"", StyleHint::Ticket);
        let upstream = build_prompt("Original title: \"x\"", StyleHint::UpstreamFix);

        assert!(ticket.contains("software release note"));
        assert!(upstream.contains("upstream bug fix"));
        assert!(ticket.ends_with("Release Note Summary:"));
        assert!(ticket.contains("Original title: \"x\""));
    }
}
