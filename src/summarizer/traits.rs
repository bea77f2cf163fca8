//! Traits related to LLM summarization
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{error::SummarizerError, settings::LlmSettings, summarizer::StyleHint};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `raw_text` into one user-facing sentence. Every call is
    /// independent; identical input may produce different output.
    async fn summarize(
        &self,
        settings: &LlmSettings,
        raw_text: &str,
        style: StyleHint,
    ) -> Result<String, SummarizerError>;
}
