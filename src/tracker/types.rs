use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::TrackerError;

/// Normalized ticket returned from any tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub key: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub issue_type: String,
}

/// Outcome of fetching a set of keys: every requested key appears in exactly
/// one of the two maps.
#[derive(Debug, Default)]
pub struct TicketBatch {
    pub found: BTreeMap<String, Ticket>,
    pub failed: BTreeMap<String, TrackerError>,
}
