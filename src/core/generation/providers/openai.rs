//! OpenAI Provider Implementations
//!
//! Two adapters share OpenAI's wire shape: `OpenAiImageProvider` for the
//! image generation endpoint (DALL-E), and `ChatCompletionProvider` for
//! chat-style completion endpoints. DeepSeek reuses both shapes against
//! its own base endpoint.

use super::{build_http_client, GenerationProvider, QualityTier};
use crate::core::generation::types::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Documented prompt ceiling for DALL-E 3. Longer prompts are truncated
/// before sending.
pub const IMAGE_PROMPT_LIMIT: usize = 4000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

// ============================================================================
// Image Generation
// ============================================================================

/// Synchronous image provider against the OpenAI images endpoint.
pub struct OpenAiImageProvider {
    provider: &'static str,
    api_key: String,
    model: String,
    size: &'static str,
    quality: QualityTier,
    style: Option<&'static str>,
    base_url: String,
    client: Client,
}

impl OpenAiImageProvider {
    pub fn new(api_key: String, model: String, quality: QualityTier) -> Self {
        Self {
            provider: "openai",
            api_key,
            model,
            // Close to the tarot card aspect ratio.
            size: "1024x1792",
            quality,
            style: Some("vivid"),
            base_url: OPENAI_BASE_URL.to_string(),
            client: build_http_client(REQUEST_TIMEOUT),
        }
    }

    /// DeepSeek's image endpoint shares the request shape but not the
    /// model catalog or size limits.
    pub fn for_deepseek(api_key: String, base_url: String) -> Self {
        Self {
            provider: "deepseek",
            api_key,
            model: "deepseek-image".to_string(),
            size: "512x896",
            quality: QualityTier::Standard,
            style: None,
            base_url,
            client: build_http_client(REQUEST_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl GenerationProvider for OpenAiImageProvider {
    fn id(&self) -> &'static str {
        self.provider
    }

    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let prompt: String = prompt.chars().take(IMAGE_PROMPT_LIMIT).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "size": self.size,
            "quality": self.quality.as_str(),
            "n": 1,
        });
        if let Some(style) = self.style {
            body["style"] = serde_json::Value::String(style.to_string());
        }

        let resp = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(self.provider, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(self.provider, status.as_u16()));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| ProviderError::Malformed(self.provider))?;

        json["data"][0]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::Malformed(self.provider))
    }
}

// ============================================================================
// Chat Completion
// ============================================================================

/// Synchronous text provider against an OpenAI-compatible chat endpoint.
/// Sampling temperature and token budget are fixed for readings.
pub struct ChatCompletionProvider {
    provider: &'static str,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl ChatCompletionProvider {
    pub fn new(provider: &'static str, api_key: String, model: String) -> Self {
        Self {
            provider,
            api_key,
            model,
            base_url: OPENAI_BASE_URL.to_string(),
            temperature: 0.8,
            max_tokens: 800,
            client: build_http_client(REQUEST_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl GenerationProvider for ChatCompletionProvider {
    fn id(&self) -> &'static str {
        self.provider
    }

    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(self.provider, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(self.provider, status.as_u16()));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| ProviderError::Malformed(self.provider))?;

        // An empty or missing completion is as useless as no response.
        match json["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(ProviderError::Malformed(self.provider)),
        }
    }
}
