//! Release records and the inputs that create or edit them.
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    sync::LazyLock,
};
use url::Url;

use crate::error::{RelnotesError, Result};

static TICKET_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").expect("valid ticket key regex")
});

static LIST_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("valid separator regex"));

/// A persisted release and its last generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: String,
    pub project: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_date: Option<NaiveDate>,
    #[serde(default)]
    pub highlights: String,
    #[serde(default)]
    pub ticket_keys: BTreeSet<String>,
    #[serde(default)]
    pub upstream_release_urls: Vec<String>,
    #[serde(default)]
    pub upstream_bug_urls: Vec<String>,
    #[serde(default)]
    pub generated_markdown: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Release {
    /// Build a new record from validated draft input.
    pub fn from_draft(id: String, draft: ReleaseDraft) -> Result<Self> {
        let project = required_text(&draft.project, "project")?;
        let version = required_text(&draft.version, "version")?;
        let now = Utc::now();

        Ok(Self {
            id,
            project,
            version,
            codename: non_blank(draft.codename),
            planned_date: draft.planned_date,
            highlights: draft.highlights.unwrap_or_default(),
            ticket_keys: normalize_ticket_keys(&draft.ticket_keys)?,
            upstream_release_urls: normalize_urls(&draft.upstream_release_urls)?,
            upstream_bug_urls: normalize_urls(&draft.upstream_bug_urls)?,
            generated_markdown: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial edit. Never touches `generated_markdown`.
    pub fn apply(&mut self, patch: ReleasePatch) -> Result<()> {
        if let Some(project) = patch.project {
            self.project = required_text(&project, "project")?;
        }
        if let Some(version) = patch.version {
            self.version = required_text(&version, "version")?;
        }
        if let Some(codename) = patch.codename {
            self.codename = non_blank(codename);
        }
        if let Some(planned_date) = patch.planned_date {
            self.planned_date = planned_date;
        }
        if let Some(highlights) = patch.highlights {
            self.highlights = highlights;
        }
        if let Some(keys) = patch.ticket_keys {
            self.ticket_keys = normalize_ticket_keys(&keys)?;
        }
        if let Some(urls) = patch.upstream_release_urls {
            self.upstream_release_urls = normalize_urls(&urls)?;
        }
        if let Some(urls) = patch.upstream_bug_urls {
            self.upstream_bug_urls = normalize_urls(&urls)?;
        }

        self.updated_at = Utc::now();

        Ok(())
    }

    /// Whether this record and `other` describe the same project version.
    pub fn same_identity(&self, project: &str, version: &str) -> bool {
        self.project.eq_ignore_ascii_case(project.trim())
            && self.version == version.trim()
    }
}

/// Input for creating a release. List fields accept either separate entries
/// or comma/whitespace separated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseDraft {
    pub project: String,
    pub version: String,
    pub codename: Option<String>,
    pub planned_date: Option<NaiveDate>,
    pub highlights: Option<String>,
    pub ticket_keys: Vec<String>,
    pub upstream_release_urls: Vec<String>,
    pub upstream_bug_urls: Vec<String>,
}

/// Partial edit of a release. `None` leaves the field unchanged; for
/// `codename` and `planned_date`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleasePatch {
    pub project: Option<String>,
    pub version: Option<String>,
    #[serde(with = "double_option")]
    pub codename: Option<Option<String>>,
    #[serde(with = "double_option")]
    pub planned_date: Option<Option<NaiveDate>>,
    pub highlights: Option<String>,
    pub ticket_keys: Option<Vec<String>>,
    pub upstream_release_urls: Option<Vec<String>>,
    pub upstream_bug_urls: Option<Vec<String>>,
}

// Distinguishes a missing field (None) from an explicit null (Some(None)).
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Split free-form list input on commas and whitespace.
pub fn split_list(raw: &str) -> Vec<String> {
    LIST_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trim, upper-case, dedupe and sort ticket keys, rejecting anything that
/// does not look like `PROJ-123`.
pub fn normalize_ticket_keys(raw: &[String]) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    let mut invalid = vec![];

    for key in raw.iter().flat_map(|entry| split_list(entry)) {
        let key = key.to_uppercase();
        if TICKET_KEY_RE.is_match(&key) {
            keys.insert(key);
        } else {
            invalid.push(key);
        }
    }

    if !invalid.is_empty() {
        return Err(RelnotesError::invalid_input(format!(
            "invalid ticket keys: {}",
            invalid.join(", ")
        )));
    }

    Ok(keys)
}

/// Dedupe URLs preserving first occurrence; each must be http(s).
pub fn normalize_urls(raw: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut urls = vec![];

    for entry in raw.iter().flat_map(|entry| split_list(entry)) {
        let parsed = Url::parse(&entry).map_err(|e| {
            RelnotesError::invalid_input(format!("invalid URL {entry}: {e}"))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelnotesError::invalid_input(format!(
                "URL must use http or https: {entry}"
            )));
        }

        if seen.insert(entry.clone()) {
            urls.push(entry);
        }
    }

    Ok(urls)
}

fn required_text(value: &str, name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RelnotesError::invalid_input(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
