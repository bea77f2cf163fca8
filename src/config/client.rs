use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for tracker requests, in seconds.
pub const DEFAULT_TRACKER_TIMEOUT_SECS: u64 = 10;
/// Default timeout for upstream page requests, in seconds.
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 10;
/// Default timeout for LLM requests, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;
/// Default number of in-flight outbound calls per generation.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default LLM API root.
pub const DEFAULT_LLM_BASE_URL: &str =
    "https://generativelanguage.googleapis.com";
/// Default LLM model.
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";
/// Element holding the bug title on upstream Jira pages.
pub const DEFAULT_TITLE_ELEMENT_ID: &str = "summary-val";
/// Element holding the bug description on upstream Jira pages.
pub const DEFAULT_DESCRIPTION_ELEMENT_ID: &str = "descriptionmodule";

/// Outbound HTTP client settings shared by every generation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout for a single tracker request.
    pub tracker_timeout_secs: u64,
    /// Timeout for a single upstream page request.
    pub scrape_timeout_secs: u64,
    /// Timeout for a single LLM request.
    pub llm_timeout_secs: u64,
    /// Maximum outbound calls in flight at once per generation stage.
    pub max_concurrency: usize,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tracker_timeout_secs: DEFAULT_TRACKER_TIMEOUT_SECS,
            scrape_timeout_secs: DEFAULT_SCRAPE_TIMEOUT_SECS,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: format!("relnotes/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn tracker_timeout(&self) -> Duration {
        Duration::from_secs(self.tracker_timeout_secs)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// LLM endpoint configuration. The API key itself lives in the stored
/// settings, not here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct LlmConfig {
    /// API root, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// Model name used in the `generateContent` path.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.into(),
            model: DEFAULT_LLM_MODEL.into(),
        }
    }
}

/// Markup assumptions about upstream bug pages.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct ScraperConfig {
    /// `id` of the element containing the bug title.
    pub title_element_id: String,
    /// `id` of the element containing the fix description.
    pub description_element_id: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            title_element_id: DEFAULT_TITLE_ELEMENT_ID.into(),
            description_element_id: DEFAULT_DESCRIPTION_ELEMENT_ID.into(),
        }
    }
}
