//! Common test helper functions shared across test modules.
//!
//! This module provides reusable fixtures for settings, releases and
//! tickets so component tests can stay focused on behaviour.
use axum::Router;
use chrono::NaiveDate;
use tokio::net::TcpListener;

use crate::{
    release::ReleaseDraft,
    settings::{ResolvedSettings, Settings},
    tracker::types::Ticket,
};

/// Base URL used by [`create_test_settings`].
pub const TEST_TRACKER_URL: &str = "https://tracker.example.com";

/// Creates complete stored settings pointing at [`TEST_TRACKER_URL`].
///
/// # Example
/// ```ignore
/// let settings = Settings {
///     tracker_token: None,
///     ..create_test_settings()
/// };
/// ```
pub fn create_test_settings() -> Settings {
    Settings {
        tracker_base_url: Some(TEST_TRACKER_URL.into()),
        tracker_email: Some("bot@example.com".into()),
        tracker_token: Some("tracker-token".into()),
        llm_token: Some("llm-token".into()),
    }
}

/// Resolved form of [`create_test_settings`].
pub fn resolved_test_settings() -> ResolvedSettings {
    create_test_settings().resolve().unwrap()
}

/// Resolved test settings with the tracker pointing at `base_url`, e.g. a
/// server started by [`spawn_stub_server`].
pub fn resolved_settings_for(base_url: &str) -> ResolvedSettings {
    Settings {
        tracker_base_url: Some(base_url.into()),
        ..create_test_settings()
    }
    .resolve()
    .unwrap()
}

/// Serves `router` on an ephemeral local port and returns its base URL,
/// e.g. `http://127.0.0.1:41234`.
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    base
}

/// Creates a draft for PSMDB 2.15.0 with a single ticket and no upstream
/// links.
pub fn create_test_draft() -> ReleaseDraft {
    ReleaseDraft {
        project: "PSMDB".into(),
        version: "2.15.0".into(),
        codename: None,
        planned_date: NaiveDate::from_ymd_opt(2025, 3, 14),
        highlights: None,
        ticket_keys: vec!["PSMDB-100".into()],
        upstream_release_urls: vec![],
        upstream_bug_urls: vec![],
    }
}

/// Creates a ticket whose title and description are derived from `key`.
///
/// # Arguments
/// * `key` - Ticket key, e.g. `PSMDB-100`
/// * `issue_type` - Tracker issue type name, e.g. `Bug` or `Story`
pub fn create_test_ticket(key: &str, issue_type: &str) -> Ticket {
    Ticket {
        key: key.to_string(),
        title: format!("Title of {key}"),
        description: format!("Description of {key}"),
        status: "Done".into(),
        issue_type: issue_type.into(),
    }
}
