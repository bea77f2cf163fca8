//! Traits related to issue trackers
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::TrackerError, settings::TrackerSettings, tracker::types::Ticket,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Fetch a single ticket by key using the given credentials.
    async fn fetch_ticket(
        &self,
        settings: &TrackerSettings,
        key: &str,
    ) -> Result<Ticket, TrackerError>;
}
