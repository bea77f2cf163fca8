//! Release document assembly.
//!
//! [`Assembler::generate`] resolves settings, fans out to the tracker,
//! scraper and summarizer, and renders the results into Markdown. Per-item
//! failures become placeholders in the document and are reported next to
//! it; only configuration errors abort a run.
use chrono::Local;
use derive_builder::Builder;
use futures_util::{StreamExt, stream};
use log::*;
use regex::Regex;
use serde::Serialize;
use std::{collections::BTreeMap, sync::LazyLock};

use crate::{
    config::{Config, DocumentConfig, client::DEFAULT_MAX_CONCURRENCY},
    error::{RelnotesError, Result},
    release::Release,
    scraper::{bug_id_from_url, html::HtmlScraper, traits::Scraper},
    settings::{LlmSettings, ResolvedSettings, Settings, TrackerSettings},
    summarizer::{StyleHint, gemini::GeminiSummarizer, raw_text, traits::Summarizer},
    tracker::{fetch_tickets, jira::JiraTracker, traits::Tracker, types::Ticket},
};

pub mod category;
pub mod template;


use category::Category;
use template::{
    DocumentContext, SectionContext, TicketEntry, UpstreamBugEntry, UpstreamLink,
};

/// Text used for an upstream bug whose page could not be scraped.
pub const SCRAPE_PLACEHOLDER: &str = "fix description unavailable";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

/// Text used in a ticket's slot when it could not be fetched or summarized.
pub fn placeholder(reason: &str) -> String {
    format!("could not summarize ({reason})")
}

/// Which stage an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Tracker,
    Scrape,
    Summarizer,
}

/// An item that ended up as a placeholder in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Ticket key or upstream bug URL.
    pub item: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub markdown: String,
    pub failures: Vec<ItemFailure>,
}

#[derive(Builder)]
#[builder(pattern = "owned", build_fn(private, name = "_build"))]
pub struct AssemblerParams {
    pub tracker: Box<dyn Tracker>,
    pub scraper: Box<dyn Scraper>,
    pub summarizer: Box<dyn Summarizer>,
    #[builder(default)]
    pub document: DocumentConfig,
    #[builder(default = "DEFAULT_MAX_CONCURRENCY")]
    pub concurrency: usize,
}

impl AssemblerParamsBuilder {
    pub fn build(self) -> Result<Assembler> {
        let params = self._build().map_err(|e| {
            RelnotesError::config(format!("failed to build assembler: {e}"))
        })?;
        Ok(Assembler::new(params))
    }
}

pub struct Assembler {
    tracker: Box<dyn Tracker>,
    scraper: Box<dyn Scraper>,
    summarizer: Box<dyn Summarizer>,
    document: DocumentConfig,
    concurrency: usize,
}

// A ticket slot before rendering.
struct TicketSlot {
    key: String,
    category: Category,
    text: String,
}

impl Assembler {
    pub fn builder() -> AssemblerParamsBuilder {
        AssemblerParamsBuilder::default()
    }

    pub fn new(params: AssemblerParams) -> Self {
        Self {
            tracker: params.tracker,
            scraper: params.scraper,
            summarizer: params.summarizer,
            document: params.document,
            concurrency: params.concurrency.max(1),
        }
    }

    /// Assembler backed by the Jira, HTML and Gemini clients described by
    /// `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder()
            .tracker(Box::new(JiraTracker::new(&config.client)?))
            .scraper(Box::new(HtmlScraper::new(
                &config.client,
                config.scraper.clone(),
            )?))
            .summarizer(Box::new(GeminiSummarizer::new(
                &config.client,
                &config.llm,
            )?))
            .document(config.document.clone())
            .concurrency(config.client.max_concurrency)
            .build()
    }

    /// Build the document for `release`. Fails only when `settings` do not
    /// resolve or the template cannot be rendered; that check happens
    /// before any outbound request.
    pub async fn generate(
        &self,
        release: &Release,
        settings: &Settings,
    ) -> Result<GeneratedDocument> {
        let settings: ResolvedSettings = settings.resolve()?;

        info!(
            "generating release notes for {} {} ({} tickets, {} upstream bugs)",
            release.project,
            release.version,
            release.ticket_keys.len(),
            release.upstream_bug_urls.len()
        );

        let mut failures = vec![];

        let (tickets, bugs) = tokio::join!(
            self.ticket_slots(release, &settings),
            self.upstream_bugs(&release.upstream_bug_urls, &settings.llm),
        );

        let (slots, ticket_failures) = tickets;
        let (bug_entries, bug_failures) = bugs;
        failures.extend(ticket_failures);
        failures.extend(bug_failures);

        for failure in failures.iter() {
            warn!(
                "{} failed for {}: {}",
                kind_label(failure.kind),
                failure.item,
                failure.message
            );
        }

        let context = DocumentContext {
            project: release.project.clone(),
            version: release.version.clone(),
            codename: release.codename.clone(),
            release_date: release
                .planned_date
                .unwrap_or_else(|| Local::now().date_naive())
                .format("%Y-%m-%d")
                .to_string(),
            upstream_name: self.document.upstream_name().to_string(),
            intro_links: upstream_links(
                &release.upstream_release_urls,
                self.document.upstream_name(),
            )
            .into_iter()
            .filter(|l| l.version.is_some())
            .collect(),
            highlights: release.highlights.trim().to_string(),
            upstream_bugs: bug_entries,
            release_links: upstream_links(
                &release.upstream_release_urls,
                self.document.upstream_name(),
            ),
            sections: sections(slots, &settings.tracker),
        };

        let markdown = template::render(self.document.template.as_deref(), &context)?;

        info!(
            "generated release notes for {} {} with {} failed items",
            release.project,
            release.version,
            failures.len()
        );

        Ok(GeneratedDocument { markdown, failures })
    }

    async fn ticket_slots(
        &self,
        release: &Release,
        settings: &ResolvedSettings,
    ) -> (Vec<TicketSlot>, Vec<ItemFailure>) {
        let batch = fetch_tickets(
            self.tracker.as_ref(),
            &settings.tracker,
            &release.ticket_keys,
            self.concurrency,
        )
        .await;

        let mut slots = vec![];
        let mut failures = vec![];

        for (key, err) in batch.failed {
            failures.push(ItemFailure {
                item: key.clone(),
                kind: FailureKind::Tracker,
                message: err.to_string(),
            });
            slots.push(TicketSlot {
                key,
                category: Category::Other,
                text: placeholder(&err.to_string()),
            });
        }

        let summaries: Vec<(Ticket, std::result::Result<String, String>)> =
            stream::iter(batch.found.into_values())
                .map(|ticket| async move {
                    let result = self
                        .summarizer
                        .summarize(
                            &settings.llm,
                            &raw_text(&ticket.title, &ticket.description),
                            StyleHint::Ticket,
                        )
                        .await
                        .map_err(|e| e.to_string());
                    (ticket, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        for (ticket, result) in summaries {
            let category =
                Category::for_issue_type(&ticket.issue_type, &self.document.categories);

            let text = match result {
                Ok(summary) => summary,
                Err(message) => {
                    let text = placeholder(&message);
                    failures.push(ItemFailure {
                        item: ticket.key.clone(),
                        kind: FailureKind::Summarizer,
                        message,
                    });
                    text
                }
            };

            slots.push(TicketSlot {
                key: ticket.key,
                category,
                text,
            });
        }

        (slots, failures)
    }

    async fn upstream_bugs(
        &self,
        urls: &[String],
        llm: &LlmSettings,
    ) -> (Vec<UpstreamBugEntry>, Vec<ItemFailure>) {
        if urls.is_empty() {
            return (vec![], vec![]);
        }

        info!("processing {} upstream bug pages", urls.len());

        let mut results: Vec<(usize, UpstreamBugEntry, Option<ItemFailure>)> =
            stream::iter(urls.iter().cloned().enumerate())
                .map(|(index, url)| async move {
                    let (entry, failure) = self.upstream_bug(&url, llm).await;
                    (index, entry, failure)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        results.sort_by_key(|(index, _, _)| *index);

        let mut entries = vec![];
        let mut failures = vec![];

        for (_, entry, failure) in results {
            entries.push(entry);
            failures.extend(failure);
        }

        (entries, failures)
    }

    async fn upstream_bug(
        &self,
        url: &str,
        llm: &LlmSettings,
    ) -> (UpstreamBugEntry, Option<ItemFailure>) {
        let page = match self.scraper.scrape(url).await {
            Ok(page) => page,
            Err(err) => {
                return (
                    UpstreamBugEntry {
                        id: bug_id_from_url(url),
                        url: url.to_string(),
                        text: SCRAPE_PLACEHOLDER.into(),
                    },
                    Some(ItemFailure {
                        item: url.to_string(),
                        kind: FailureKind::Scrape,
                        message: err.to_string(),
                    }),
                );
            }
        };

        let summary = self
            .summarizer
            .summarize(
                llm,
                &raw_text(&page.title, &page.description),
                StyleHint::UpstreamFix,
            )
            .await;

        match summary {
            Ok(text) => (
                UpstreamBugEntry {
                    id: page.id,
                    url: page.url,
                    text,
                },
                None,
            ),
            Err(err) => (
                UpstreamBugEntry {
                    id: page.id,
                    url: page.url,
                    text: placeholder(&err.to_string()),
                },
                Some(ItemFailure {
                    item: url.to_string(),
                    kind: FailureKind::Summarizer,
                    message: err.to_string(),
                }),
            ),
        }
    }
}

fn kind_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Tracker => "ticket fetch",
        FailureKind::Scrape => "upstream scrape",
        FailureKind::Summarizer => "summary",
    }
}

// Group slots into non-empty sections in document order, bullets sorted by key.
fn sections(slots: Vec<TicketSlot>, tracker: &TrackerSettings) -> Vec<SectionContext> {
    let mut grouped: BTreeMap<Category, Vec<TicketEntry>> = BTreeMap::new();

    for slot in slots {
        grouped.entry(slot.category).or_default().push(TicketEntry {
            link: tracker.browse_url(&slot.key),
            key: slot.key,
            text: slot.text,
        });
    }

    Category::ORDERED
        .iter()
        .filter_map(|category| {
            let mut entries = grouped.remove(category)?;
            entries.sort_by(|a, b| a.key.cmp(&b.key));
            Some(SectionContext {
                heading: category.heading().to_string(),
                entries,
            })
        })
        .collect()
}

/// Links to upstream release notes, ordered by the `X.Y.Z` version found in
/// the URL. Links without a version keep their input order after the rest.
pub fn upstream_links(urls: &[String], upstream_name: &str) -> Vec<UpstreamLink> {
    let mut links: Vec<(Option<(u64, u64, u64)>, UpstreamLink)> = urls
        .iter()
        .map(|url| {
            let captures = VERSION_RE.captures(url);
            let version = captures.as_ref().map(|c| c[0].to_string());
            let sort_key = captures.as_ref().and_then(|c| {
                Some((c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?))
            });
            let label = match &version {
                Some(v) => format!("{upstream_name} {v}"),
                None => format!("{upstream_name} release notes"),
            };
            (
                sort_key,
                UpstreamLink {
                    version,
                    label,
                    url: url.clone(),
                },
            )
        })
        .collect();

    links.sort_by_key(|(key, _)| (key.is_none(), *key));
    links.into_iter().map(|(_, link)| link).collect()
}
