//! Common test utilities for assembler tests.

use crate::{
    assembler::Assembler,
    config::DocumentConfig,
    release::{Release, ReleaseDraft},
    scraper::{BugPage, bug_id_from_url, traits::MockScraper},
    summarizer::traits::MockSummarizer,
    test_helpers::create_test_draft,
    tracker::traits::MockTracker,
};

pub const UPSTREAM_NAME: &str = "MongoDB Community Edition";

/// Creates an assembler over the given mocks with a fixed upstream name.
///
/// # Example
/// ```ignore
/// let mut tracker = MockTracker::new();
/// tracker.expect_fetch_ticket().never();
/// let assembler = create_test_assembler(tracker, MockScraper::new(), MockSummarizer::new());
/// ```
pub fn create_test_assembler(
    tracker: MockTracker,
    scraper: MockScraper,
    summarizer: MockSummarizer,
) -> Assembler {
    Assembler::builder()
        .tracker(Box::new(tracker))
        .scraper(Box::new(scraper))
        .summarizer(Box::new(summarizer))
        .document(DocumentConfig {
            upstream_name: UPSTREAM_NAME.into(),
            ..DocumentConfig::default()
        })
        .concurrency(2usize)
        .build()
        .unwrap()
}

/// Creates a release with the given ticket keys and upstream links.
pub fn create_release(
    keys: &[&str],
    release_urls: &[&str],
    bug_urls: &[&str],
) -> Release {
    let draft = ReleaseDraft {
        ticket_keys: keys.iter().map(|k| k.to_string()).collect(),
        upstream_release_urls: release_urls.iter().map(|u| u.to_string()).collect(),
        upstream_bug_urls: bug_urls.iter().map(|u| u.to_string()).collect(),
        ..create_test_draft()
    };
    Release::from_draft("release-1".into(), draft).unwrap()
}

/// Summarizer that echoes the first line of its input.
pub fn echo_summarizer() -> MockSummarizer {
    let mut summarizer = MockSummarizer::new();
    summarizer.expect_summarize().returning(|_, raw, _| {
        Ok(format!("Summary of {}", raw.lines().next().unwrap_or_default()))
    });
    summarizer
}

/// Scraper returning a page titled after the bug id for every URL.
pub fn page_scraper() -> MockScraper {
    let mut scraper = MockScraper::new();
    scraper.expect_scrape().returning(|url| {
        let id = bug_id_from_url(url);
        Ok(BugPage {
            title: format!("Upstream {id}"),
            description: format!("Fixed {id}."),
            id,
            url: url.to_string(),
        })
    });
    scraper
}

/// Position of `needle` in `haystack`, panicking with context when absent.
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{haystack}"))
}
