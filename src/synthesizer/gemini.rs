//! Gemini `generateContent` client

use super::TextGenerator;
use crate::config::Config;
use crate::error::{FloraIdError, Result};
use crate::http::send_checked;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the API key; never put the key in the URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Analyses over many species take well beyond the scraping timeout
const GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    /// Text of the first candidate; `None` when blocked or empty
    fn into_text(self) -> Option<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            debug!("prompt blocked: {}", reason);
            return None;
        }

        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate.content.parts.into_iter().map(|p| p.text).collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Requires an API key in `config`
    pub fn from_config(client: Client, config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(client, &config.gemini_url, &config.model, api_key))
    }

    fn endpoint(&self) -> String {
        let model = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = send_checked(
            self.client
                .post(self.endpoint())
                .header(API_KEY_HEADER, self.api_key.as_str())
                .timeout(GENERATION_TIMEOUT)
                .json(&request),
        )
        .await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| FloraIdError::ApiParse(format!("generateContent: {}", e)))?;

        Ok(body.into_text())
    }
}
