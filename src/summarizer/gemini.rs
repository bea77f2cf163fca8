//! Implements the Summarizer trait for the Gemini generateContent API
use async_trait::async_trait;
use log::*;
use reqwest::{Client, Url, header::CONTENT_TYPE};

use crate::{
    config::{ClientConfig, LlmConfig},
    error::{Result, SummarizerError},
    settings::LlmSettings,
    summarizer::{
        StyleHint, build_prompt,
        gemini::types::{
            ErrorResponse, GenerateContentRequest, GenerateContentResponse,
        },
        traits::Summarizer,
    },
};

mod types;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini summarizer. The API key is passed per call in the
/// `x-goog-api-key` header, never in the URL.
pub struct GeminiSummarizer {
    client: Client,
    endpoint: Url,
}

impl GeminiSummarizer {
    pub fn new(client_config: &ClientConfig, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(client_config.llm_timeout())
            .user_agent(client_config.user_agent.clone())
            .build()?;

        let endpoint = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        ))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(
        &self,
        settings: &LlmSettings,
        raw_text: &str,
        style: StyleHint,
    ) -> std::result::Result<String, SummarizerError> {
        if raw_text.trim().is_empty() {
            return Err(SummarizerError::EmptyInput);
        }

        let body = GenerateContentRequest::from_prompt(build_prompt(raw_text, style));

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, settings.token())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| format!("{} {}", e.error.code, e.error.message))
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(SummarizerError::Api(message));
        }

        let summary = parse_summary(&text)?;
        debug!("summarized {} chars into: {summary}", raw_text.len());

        Ok(summary)
    }
}

/// Extract the first candidate's text from a `generateContent` response.
pub fn parse_summary(body: &str) -> std::result::Result<String, SummarizerError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| SummarizerError::UnexpectedResponse(e.to_string()))?;

    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.trim().to_string())
        .ok_or_else(|| {
            SummarizerError::UnexpectedResponse("no candidates returned".into())
        })?;

    if text.is_empty() {
        return Err(SummarizerError::EmptyOutput);
    }

    Ok(text)
}
