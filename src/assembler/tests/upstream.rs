use crate::{
    assembler::{FailureKind, SCRAPE_PLACEHOLDER, tests::common::*, upstream_links},
    error::ScrapeError,
    scraper::{BugPage, traits::MockScraper},
    summarizer::{StyleHint, traits::MockSummarizer},
    test_helpers::create_test_settings,
    tracker::traits::MockTracker,
};

const BUG_1: &str = "https://jira.mongodb.org/browse/SERVER-1";
const BUG_2: &str = "https://jira.mongodb.org/browse/SERVER-2";
const NOTES_804: &str = "https://www.mongodb.com/docs/manual/release-notes/8.0/#8.0.4";
const NOTES_8010: &str = "https://www.mongodb.com/docs/manual/release-notes/8.0/#8.0.10";

#[tokio::test]
async fn renders_upstream_bullets_in_input_order() {
    let mut summarizer = MockSummarizer::new();
    summarizer
        .expect_summarize()
        .withf(|_, _, style| *style == StyleHint::UpstreamFix)
        .returning(|_, raw, _| {
            if raw.contains("SERVER-2") {
                Ok("Second fix.".into())
            } else {
                Ok("First fix.".into())
            }
        });

    let assembler =
        create_test_assembler(MockTracker::new(), page_scraper(), summarizer);
    let release = create_release(&[], &[NOTES_8010, NOTES_804], &[BUG_2, BUG_1]);

    let doc = assembler
        .generate(&release, &create_test_settings())
        .await
        .unwrap();
    let md = &doc.markdown;

    assert!(doc.failures.is_empty());
    assert!(md.contains("## Upstream Improvements"));
    assert!(md.contains(&format!("* [SERVER-2]({BUG_2}) - Second fix.")));
    assert!(md.contains(&format!("* [SERVER-1]({BUG_1}) - First fix.")));
    assert!(position(md, "[SERVER-2]") < position(md, "[SERVER-1]"));

    assert!(md.contains(&format!(
        "includes the improvements and bug fixes of [{UPSTREAM_NAME} 8.0.4]({NOTES_804}), [{UPSTREAM_NAME} 8.0.10]({NOTES_8010})."
    )));
    assert!(md.contains(&format!(
        "Find the full list of changes in the following {UPSTREAM_NAME} release notes:\n\n* [{UPSTREAM_NAME} 8.0.4]({NOTES_804})\n* [{UPSTREAM_NAME} 8.0.10]({NOTES_8010})\n"
    )));
    assert!(!md.contains("## New Features"));
}

#[tokio::test]
async fn scrape_failure_degrades_to_placeholder() {
    let mut scraper = MockScraper::new();
    scraper.expect_scrape().returning(|url| {
        if url.ends_with("SERVER-1") {
            Err(ScrapeError::MissingElement {
                url: url.into(),
                element: "descriptionmodule".into(),
            })
        } else {
            Ok(BugPage {
                id: "SERVER-2".into(),
                url: url.into(),
                title: "Crash".into(),
                description: "Fixed.".into(),
            })
        }
    });

    let mut summarizer = MockSummarizer::new();
    summarizer
        .expect_summarize()
        .times(1)
        .returning(|_, _, _| Ok("Fixed a crash.".into()));

    let assembler = create_test_assembler(MockTracker::new(), scraper, summarizer);
    let release = create_release(&[], &[], &[BUG_1, BUG_2]);

    let doc = assembler
        .generate(&release, &create_test_settings())
        .await
        .unwrap();

    assert!(
        doc.markdown
            .contains(&format!("* [SERVER-1]({BUG_1}) - {SCRAPE_PLACEHOLDER}"))
    );
    assert!(
        doc.markdown
            .contains(&format!("* [SERVER-2]({BUG_2}) - Fixed a crash."))
    );
    assert_eq!(doc.failures.len(), 1);
    assert_eq!(doc.failures[0].kind, FailureKind::Scrape);
    assert_eq!(doc.failures[0].item, BUG_1);
}

#[tokio::test]
async fn release_links_without_bugs_are_not_listed() {
    let assembler = create_test_assembler(
        MockTracker::new(),
        MockScraper::new(),
        MockSummarizer::new(),
    );
    let release = create_release(&[], &[NOTES_804], &[]);

    let doc = assembler
        .generate(&release, &create_test_settings())
        .await
        .unwrap();

    assert!(doc.markdown.contains("includes the improvements and bug fixes of"));
    assert!(!doc.markdown.contains("## Upstream Improvements"));
    assert!(!doc.markdown.contains("Find the full list of changes"));
}

#[test]
fn orders_links_by_version() {
    let urls = vec![
        "https://example.com/notes".to_string(),
        NOTES_8010.to_string(),
        NOTES_804.to_string(),
    ];

    let links = upstream_links(&urls, "Upstream");

    let versions: Vec<_> = links.iter().map(|l| l.version.clone()).collect();
    assert_eq!(
        versions,
        vec![Some("8.0.4".into()), Some("8.0.10".into()), None]
    );
    assert_eq!(links[2].label, "Upstream release notes");
}
