//! Stability AI Provider Implementation
//!
//! Single request/response text-to-image generation. The response embeds
//! the rendered image as base64, which is passed through as a `data:`
//! URI so callers never need a second fetch.

use super::{build_http_client, GenerationProvider};
use crate::core::generation::types::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const STABILITY_GENERATION_URL: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-v1-6/text-to-image";

/// Steers the sampler away from common failure modes.
const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, ugly, bad anatomy, nsfw";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Stability AI (Stable Diffusion) provider.
pub struct StabilityProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl StabilityProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: STABILITY_GENERATION_URL.to_string(),
            client: build_http_client(REQUEST_TIMEOUT),
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl GenerationProvider for StabilityProvider {
    fn id(&self) -> &'static str {
        "stability"
    }

    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let body = serde_json::json!({
            "text_prompts": [
                { "text": prompt, "weight": 1 },
                { "text": NEGATIVE_PROMPT, "weight": -1 }
            ],
            "cfg_scale": 7,
            "height": 896,
            "width": 512,
            "steps": 30,
            "samples": 1,
            "style_preset": "fantasy-art",
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("stability", &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status("stability", status.as_u16()));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| ProviderError::Malformed("stability"))?;

        json["artifacts"][0]["base64"]
            .as_str()
            .map(|b64| format!("data:image/png;base64,{}", b64))
            .ok_or(ProviderError::Malformed("stability"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generation_returns_embedded_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer sk-stab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artifacts": [{ "base64": "aGVsbG8=" }]
            })))
            .mount(&server)
            .await;

        let provider =
            StabilityProvider::new("sk-stab".to_string()).with_endpoint(server.uri());
        let artifact = provider.generate("The Star tarot card").await.unwrap();
        assert_eq!(artifact, "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_generation_sends_negative_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artifacts": [{ "base64": "eA==" }]
            })))
            .mount(&server)
            .await;

        let provider = StabilityProvider::new("sk".to_string()).with_endpoint(server.uri());
        provider.generate("prompt").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["text_prompts"][0]["text"], "prompt");
        assert_eq!(body["text_prompts"][1]["weight"], -1);
        assert_eq!(body["style_preset"], "fantasy-art");
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = StabilityProvider::new("bad".to_string()).with_endpoint(server.uri());
        let err = provider.generate("prompt").await.unwrap_err();
        assert_eq!(err, ProviderError::Auth("stability"));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "artifacts": [] })))
            .mount(&server)
            .await;

        let provider = StabilityProvider::new("sk".to_string()).with_endpoint(server.uri());
        let err = provider.generate("prompt").await.unwrap_err();
        assert_eq!(err, ProviderError::Malformed("stability"));
    }
}
