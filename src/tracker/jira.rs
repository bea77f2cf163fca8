//! Implements the Tracker trait for Jira
use async_trait::async_trait;
use log::*;
use reqwest::{Client, header::ACCEPT};

use crate::{
    config::ClientConfig,
    error::{Result, TrackerError},
    settings::TrackerSettings,
    tracker::{
        jira::types::{JiraIssue, NamedField},
        traits::Tracker,
        types::Ticket,
    },
};

mod types;

/// Issue type assumed when the tracker omits one.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Jira tracker using reqwest with HTTP Basic (email + API token)
/// authentication. Credentials are supplied per call.
pub struct JiraTracker {
    client: Client,
}

impl JiraTracker {
    /// Create Jira client with the configured request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.tracker_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Tracker for JiraTracker {
    async fn fetch_ticket(
        &self,
        settings: &TrackerSettings,
        key: &str,
    ) -> std::result::Result<Ticket, TrackerError> {
        let url = settings.issue_url(key).map_err(|e| {
            TrackerError::UnexpectedResponse {
                key: key.to_string(),
                message: format!("could not build issue URL: {e}"),
            }
        })?;

        debug!("fetching ticket {key} from {url}");

        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .basic_auth(&settings.email, Some(settings.token()))
            .build()
            .map_err(|e| TrackerError::from_reqwest(key, e))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TrackerError::from_reqwest(key, e))?;

        if let Some(err) =
            TrackerError::from_status(key, response.status().as_u16())
        {
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::from_reqwest(key, e))?;

        parse_issue(key, &body)
    }
}

/// Decode an issue response body into a [`Ticket`]. The ticket keeps the
/// requested `key` even when the tracker answers for a moved issue.
pub fn parse_issue(
    key: &str,
    body: &str,
) -> std::result::Result<Ticket, TrackerError> {
    let issue: JiraIssue = serde_json::from_str(body).map_err(|e| {
        TrackerError::UnexpectedResponse {
            key: key.to_string(),
            message: e.to_string(),
        }
    })?;

    let description = issue
        .fields
        .description
        .as_ref()
        .map(|d| d.to_plain_text())
        .unwrap_or_default();

    let name = |field: Option<NamedField>, default: &str| {
        field
            .map(|f| f.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    if issue.key != key {
        debug!("ticket {key} is now {}: keeping the requested key", issue.key);
    }

    Ok(Ticket {
        key: key.to_string(),
        title: issue.fields.summary.trim().to_string(),
        description,
        status: name(issue.fields.status, "Unknown"),
        issue_type: name(issue.fields.issuetype, DEFAULT_ISSUE_TYPE),
    })
}
