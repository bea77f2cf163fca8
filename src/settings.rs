//! Stored tracker and LLM credentials.
//!
//! [`Settings`] is the persisted document and may be incomplete.
//! [`Settings::resolve`] validates it into [`ResolvedSettings`], which every
//! pipeline call receives explicitly.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{RelnotesError, Result};

/// Tenant used when no tenant is specified.
pub const DEFAULT_TENANT: &str = "global_settings";

const REDACTED: &str = "********";

/// Settings document as stored. Every field may be missing.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_token: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tracker_base_url", &self.tracker_base_url)
            .field("tracker_email", &self.tracker_email)
            .field("tracker_token", &self.tracker_token.as_ref().map(|_| REDACTED))
            .field("llm_token", &self.llm_token.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl Settings {
    /// Apply `update` on top of self. Fields absent from the update keep
    /// their stored value.
    pub fn merge(&mut self, update: Settings) {
        if update.tracker_base_url.is_some() {
            self.tracker_base_url = update.tracker_base_url;
        }
        if update.tracker_email.is_some() {
            self.tracker_email = update.tracker_email;
        }
        if update.tracker_token.is_some() {
            self.tracker_token = update.tracker_token;
        }
        if update.llm_token.is_some() {
            self.llm_token = update.llm_token;
        }
    }

    /// Copy suitable for display, with tokens masked.
    pub fn redacted(&self) -> Settings {
        Settings {
            tracker_base_url: self.tracker_base_url.clone(),
            tracker_email: self.tracker_email.clone(),
            tracker_token: self.tracker_token.as_ref().map(|_| REDACTED.into()),
            llm_token: self.llm_token.as_ref().map(|_| REDACTED.into()),
        }
    }

    /// Validate stored settings. Fails with [`RelnotesError::Config`] when a
    /// field is missing, blank, or the tracker URL cannot be parsed.
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let base_url =
            required(&self.tracker_base_url, "tracker base URL")?;
        let email = required(&self.tracker_email, "tracker email")?;
        let tracker_token = required(&self.tracker_token, "tracker token")?;
        let llm_token = required(&self.llm_token, "LLM token")?;

        Ok(ResolvedSettings {
            tracker: TrackerSettings {
                base_url: normalize_base_url(base_url)?,
                email: email.to_string(),
                token: SecretString::from(tracker_token.to_string()),
            },
            llm: LlmSettings {
                token: SecretString::from(llm_token.to_string()),
            },
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RelnotesError::config(format!(
            "{name} is not set: configure it with `relnotes settings set`"
        ))),
    }
}

/// Accepts `example.atlassian.net`, `https://example.atlassian.net` or
/// `https://example.atlassian.net/`; always yields a URL without a trailing
/// slash in its path.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| {
        RelnotesError::config(format!("invalid tracker base URL {raw}: {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelnotesError::config(format!(
            "tracker base URL must use http or https: {raw}"
        )));
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    Ok(url)
}

/// Validated settings handed to every pipeline call.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub tracker: TrackerSettings,
    pub llm: LlmSettings,
}

/// Tracker connection details.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub base_url: Url,
    pub email: String,
    pub token: SecretString,
}

impl TrackerSettings {
    /// REST endpoint for a single issue.
    pub fn issue_url(&self, key: &str) -> Result<Url> {
        self.join(&format!("rest/api/3/issue/{key}"))
    }

    /// Human-facing page for a single issue.
    pub fn browse_url(&self, key: &str) -> String {
        self.join(&format!("browse/{key}"))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/browse/{key}", self.base_url))
    }

    fn join(&self, path: &str) -> Result<Url> {
        let base = format!("{}/", self.base_url.as_str().trim_end_matches('/'));
        Ok(Url::parse(&base)?.join(path)?)
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// LLM credentials.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub token: SecretString,
}

impl LlmSettings {
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}
