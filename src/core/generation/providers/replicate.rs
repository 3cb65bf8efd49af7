//! Replicate Provider Implementation
//!
//! Replicate runs image generation asynchronously: a submission returns
//! a prediction id, and the result is collected by polling the status
//! endpoint at a fixed interval until a terminal state or the attempt
//! ceiling is reached.

use super::{build_http_client, GenerationProvider};
use crate::core::generation::types::{PollingJob, ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REPLICATE_BASE_URL: &str = "https://api.replicate.com";

/// SDXL model version.
const SDXL_VERSION: &str = "ac732df83cea7fff18b8472768c88ad041fa750ff7682a21affe81863cbe77e4";

const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, ugly, bad anatomy, nsfw";

/// Default polling cadence: 60 attempts at 10 seconds, a 10 minute ceiling.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_MAX_ATTEMPTS: u32 = 60;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Replicate (SDXL) provider with submit-and-poll delivery.
pub struct ReplicateProvider {
    api_token: String,
    base_url: String,
    poll_interval: Duration,
    max_attempts: u32,
    client: Client,
}

impl ReplicateProvider {
    pub fn new(api_token: String) -> Self {
        Self {
            api_token,
            base_url: REPLICATE_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            client: build_http_client(REQUEST_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Override the polling cadence.
    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_attempts = max_attempts;
        self
    }

    /// Submit the prediction, returning its polling job record.
    async fn submit(&self, prompt: &str) -> ProviderResult<PollingJob> {
        let body = serde_json::json!({
            "version": SDXL_VERSION,
            "input": {
                "prompt": prompt,
                "negative_prompt": NEGATIVE_PROMPT,
                "width": 512,
                "height": 896,
                "num_inference_steps": 30,
                "guidance_scale": 7,
                "scheduler": "DPMSolverMultistep",
            }
        });

        let resp = self
            .client
            .post(format!("{}/v1/predictions", self.base_url))
            .header("Authorization", format!("Token {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("replicate", &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status("replicate", status.as_u16()));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| ProviderError::Malformed("replicate"))?;

        let job_id = json["id"]
            .as_str()
            .ok_or(ProviderError::Malformed("replicate"))?
            .to_string();

        Ok(PollingJob::new(job_id, self.max_attempts, self.poll_interval))
    }

    async fn fetch_status(&self, job_id: &str) -> ProviderResult<serde_json::Value> {
        let resp = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, job_id))
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("replicate", &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status("replicate", status.as_u16()));
        }

        resp.json()
            .await
            .map_err(|_| ProviderError::Malformed("replicate"))
    }

    /// Poll until a terminal state or the attempt ceiling. The job's
    /// attempt counter is the single source of truth for termination.
    async fn poll_until_done(&self, mut job: PollingJob) -> ProviderResult<String> {
        while !job.exhausted() {
            job.record_attempt();
            let prediction = self.fetch_status(&job.job_id).await?;

            match prediction["status"].as_str() {
                Some("succeeded") => {
                    return prediction["output"][0]
                        .as_str()
                        .map(str::to_string)
                        .ok_or(ProviderError::Malformed("replicate"));
                }
                Some("failed") | Some("canceled") => {
                    return Err(ProviderError::Malformed("replicate"));
                }
                _ => {}
            }

            if !job.exhausted() {
                tokio::time::sleep(job.poll_interval).await;
            }
        }

        Err(ProviderError::Timeout("replicate"))
    }
}

#[async_trait]
impl GenerationProvider for ReplicateProvider {
    fn id(&self) -> &'static str {
        "replicate"
    }

    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let job = self.submit(prompt).await?;
        self.poll_until_done(job).await
    }
}
