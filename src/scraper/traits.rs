//! Traits related to upstream page scraping
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{error::ScrapeError, scraper::BugPage};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetch `url` once and extract the bug title and fix description.
    async fn scrape(&self, url: &str) -> Result<BugPage, ScrapeError>;
}
