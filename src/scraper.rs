//! Upstream bug page scraping.

/// HTML scraper for Jira-style public bug pages.
pub mod html;

/// Common trait for page scrapers.
pub mod traits;

use serde::Serialize;

/// Text extracted from one upstream bug page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BugPage {
    /// Identifier shown in the document, taken from the URL.
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
}

/// Last non-empty path segment of `url`, e.g. `SERVER-12345` for
/// `https://jira.mongodb.org/browse/SERVER-12345`.
pub fn bug_id_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url)
        .to_string()
}
