//! Markdown rendering for generated release documents.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tera::{Context, Tera};

use crate::error::Result;

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+\n").unwrap());

/// Built-in document layout. Every optional block renders nothing when its
/// data is empty.
pub const DEFAULT_TEMPLATE: &str = r#"# {{ project }} {{ version }}{% if codename %} - "{{ codename }}"{% endif %}

*Released on: {{ release_date }}*
{% if intro_links %}
{{ project }} {{ version }} includes the improvements and bug fixes of {% for link in intro_links %}[{{ link.label }}]({{ link.url }}){% if not loop.last %}, {% endif %}{% endfor %}.
{% endif %}
{% if highlights %}
## Release Highlights

{{ highlights }}
{% endif %}
{% if upstream_bugs %}
## Upstream Improvements

The bug fixes, provided by {{ upstream_name }} and included in {{ project }} {{ version }}, are the following:

{% for bug in upstream_bugs %}* [{{ bug.id }}]({{ bug.url }}) - {{ bug.text }}
{% endfor %}
{% if release_links %}
Find the full list of changes in the following {{ upstream_name }} release notes:

{% for link in release_links %}* [{{ link.label }}]({{ link.url }})
{% endfor %}
{% endif %}
{% endif %}
{% for section in sections %}
## {{ section.heading }}

{% for entry in section.entries %}- [{{ entry.key }}]({{ entry.link }}): {{ entry.text }}
{% endfor %}
{% endfor %}
"#;

/// Everything a document template can reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentContext {
    pub project: String,
    pub version: String,
    pub codename: Option<String>,
    /// `YYYY-MM-DD`
    pub release_date: String,
    pub upstream_name: String,
    /// Upstream release links whose URL carries a version, for the intro.
    pub intro_links: Vec<UpstreamLink>,
    pub highlights: String,
    pub upstream_bugs: Vec<UpstreamBugEntry>,
    /// Every upstream release link, for the "full list of changes" block.
    pub release_links: Vec<UpstreamLink>,
    /// Non-empty ticket sections in document order.
    pub sections: Vec<SectionContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamLink {
    pub version: Option<String>,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamBugEntry {
    pub id: String,
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionContext {
    pub heading: String,
    pub entries: Vec<TicketEntry>,
}

/// One ticket bullet: a real summary or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketEntry {
    pub key: String,
    pub link: String,
    pub text: String,
}

// Stands in for the highlights while the skeleton is tidied.
const HIGHLIGHTS_MARKER: &str = "<!-- relnotes:highlights -->";

/// Render `context` with `template` (or [`DEFAULT_TEMPLATE`]), then collapse
/// blank-line runs and end the document with exactly one newline. Highlights
/// are inserted after tidying and keep their own blank lines.
pub fn render(template: Option<&str>, context: &DocumentContext) -> Result<String> {
    let template = template.unwrap_or(DEFAULT_TEMPLATE);

    let mut tera_context = Context::from_serialize(context)?;
    if !context.highlights.is_empty() {
        tera_context.insert("highlights", HIGHLIGHTS_MARKER);
    }

    let rendered = Tera::one_off(template, &tera_context, false)?;
    Ok(tidy(&rendered).replace(HIGHLIGHTS_MARKER, &context.highlights))
}

fn tidy(rendered: &str) -> String {
    let collapsed = BLANK_RUN_RE.replace_all(rendered, "\n\n");
    format!("{}\n", collapsed.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> DocumentContext {
        DocumentContext {
            project: "PSMDB".into(),
            version: "8.0.4-2".into(),
            release_date: "2025-02-01".into(),
            upstream_name: "MongoDB Community Edition".into(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_header_only_for_empty_release() {
        let markdown = render(None, &context()).unwrap();
        assert_eq!(
            markdown,
            "# PSMDB 8.0.4-2\n\n*Released on: 2025-02-01*\n"
        );
    }

    #[test]
    fn renders_codename_and_intro() {
        let link = UpstreamLink {
            version: Some("8.0.4".into()),
            label: "MongoDB Community Edition 8.0.4".into(),
            url: "https://www.mongodb.com/docs/manual/release-notes/8.0/#8.0.4".into(),
        };
        let ctx = DocumentContext {
            codename: Some("Falcon".into()),
            intro_links: vec![link.clone()],
            ..context()
        };

        let markdown = render(None, &ctx).unwrap();

        assert!(markdown.starts_with("# PSMDB 8.0.4-2 - \"Falcon\"\n"));
        assert!(markdown.contains(
            "PSMDB 8.0.4-2 includes the improvements and bug fixes of [MongoDB Community Edition 8.0.4](https://www.mongodb.com/docs/manual/release-notes/8.0/#8.0.4)."
        ));
    }

    #[test]
    fn renders_sections_with_single_blank_lines() {
        let ctx = DocumentContext {
            highlights: "Faster startup.".into(),
            sections: vec![SectionContext {
                heading: "Bug Fixes".into(),
                entries: vec![TicketEntry {
                    key: "PSMDB-1".into(),
                    link: "https://t.example.com/browse/PSMDB-1".into(),
                    text: "Fixed it.".into(),
                }],
            }],
            ..context()
        };

        let markdown = render(None, &ctx).unwrap();

        assert_eq!(
            markdown,
            "# PSMDB 8.0.4-2\n\n*Released on: 2025-02-01*\n\n## Release Highlights\n\nFaster startup.\n\n## Bug Fixes\n\n- [PSMDB-1](https://t.example.com/browse/PSMDB-1): Fixed it.\n"
        );
        assert!(!markdown.contains("\n\n\n"));
    }

    #[test]
    fn highlights_keep_their_blank_lines() {
        let highlights = "```\nline a\n\n\nline b\n```\n\n  \n    indented";
        let ctx = DocumentContext {
            highlights: highlights.into(),
            ..context()
        };

        let markdown = render(None, &ctx).unwrap();

        assert!(markdown.contains(&format!(
            "## Release Highlights\n\n{highlights}\n"
        )));
        assert!(!markdown.contains(HIGHLIGHTS_MARKER));
    }

    #[test]
    fn custom_template_is_used() {
        let markdown =
            render(Some("{{ project }}/{{ version }}\n\n\n\n"), &context()).unwrap();
        assert_eq!(markdown, "PSMDB/8.0.4-2\n");
    }

    #[test]
    fn invalid_template_is_an_error() {
        assert!(render(Some("{% if %}"), &context()).is_err());
    }
}
