//! Issue tracker access.
//!
//! [`fetch_tickets`] fans out one request per key and reports every key,
//! either as a fetched [`Ticket`] or as a [`TrackerError`].
use futures_util::{StreamExt, stream};
use log::*;
use std::collections::BTreeSet;

use crate::{
    error::TrackerError,
    settings::TrackerSettings,
    tracker::{
        traits::Tracker,
        types::{Ticket, TicketBatch},
    },
};

/// Jira REST API client implementation.
pub mod jira;

/// Common trait for tracker clients.
pub mod traits;

/// Ticket data shared by every tracker implementation.
pub mod types;

/// Fetch every key, at most `concurrency` requests at a time. Never fails as
/// a whole: failed keys land in [`TicketBatch::failed`].
pub async fn fetch_tickets(
    tracker: &dyn Tracker,
    settings: &TrackerSettings,
    keys: &BTreeSet<String>,
    concurrency: usize,
) -> TicketBatch {
    info!("fetching {} tickets", keys.len());

    let results: Vec<(String, Result<Ticket, TrackerError>)> =
        stream::iter(keys.iter().cloned())
            .map(|key| async move {
                let result = tracker.fetch_ticket(settings, &key).await;
                (key, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    let mut batch = TicketBatch::default();

    for (key, result) in results {
        match result {
            Ok(ticket) => {
                debug!("fetched ticket {key}: {}", ticket.title);
                batch.found.insert(key, ticket);
            }
            Err(err) => {
                warn!("failed to fetch ticket {key}: {err}");
                batch.failed.insert(key, err);
            }
        }
    }

    batch
}
