//! Generation Orchestration
//!
//! Turns a generation request into a finished artifact by composing a
//! prompt, invoking the configured provider adapter, and synthesizing a
//! local fallback when the provider fails. The engine boundary is total:
//! callers always receive a result, degraded or not.
//!
//! # Module Structure
//!
//! - `types`: request/result/error types
//! - `prompt`: prompt composition
//! - `providers`: provider adapters and configuration
//! - `fallback`: deterministic fallback artifact synthesis
//! - `batch`: rate-limited batch scheduling

pub mod batch;
pub mod fallback;
pub mod prompt;
pub mod providers;
pub mod types;

pub use batch::BatchScheduler;
pub use fallback::FALLBACK_PROVIDER;
pub use providers::{
    find_provider_meta, ConfigError, GenerationProvider, ProviderConfig, ProviderMeta,
    QualityTier, DEFAULT_PROVIDER, PROVIDERS,
};
pub use types::{
    ArtifactKind, GenerationRequest, GenerationResult, PollingJob, ProviderError,
    ProviderResult, ReadingContext,
};

use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Orchestration Engine
// ============================================================================

/// Drives one generation request through the adapter for its configured
/// provider. Provider failures of any kind are absorbed and replaced by
/// a synthesized fallback; `generate` never fails.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    /// Optional caller-supplied deadline for one adapter invocation.
    /// When it elapses the attempt is treated as a provider timeout.
    deadline: Option<Duration>,
}

impl GenerationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Generate the artifact for `request` using the provider selected
    /// by `config`. Total: every request resolves to exactly one result.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        config: &ProviderConfig,
    ) -> GenerationResult {
        match config.create_provider(request.kind) {
            Ok(provider) => self.generate_with(provider, request).await,
            Err(err) => {
                // Kind mismatches are rejected at the API boundary; a
                // request that still lands here gets a fallback rather
                // than a hard failure.
                log::error!("Adapter resolution failed: {}", err);
                fallback::synthesize(request)
            }
        }
    }

    /// Generate using an already-resolved adapter. Exposed for callers
    /// that configure adapters directly (custom polling cadence, tests).
    pub async fn generate_with(
        &self,
        provider: Arc<dyn GenerationProvider>,
        request: &GenerationRequest,
    ) -> GenerationResult {
        let prompt = prompt::compose(request);
        log::debug!(
            "Generating {:?} artifact for '{}' via {}",
            request.kind,
            request.card_name,
            provider.id()
        );

        match self.invoke(provider.as_ref(), &prompt).await {
            Ok(artifact) => GenerationResult::from_provider(provider.id(), artifact),
            Err(err) => {
                // Coarse kind + provider id only; the raw failure never
                // travels further.
                log::warn!(
                    "Provider {} failed ({}), synthesizing fallback for '{}'",
                    err.provider(),
                    err.kind(),
                    request.card_name
                );
                fallback::synthesize(request)
            }
        }
    }

    async fn invoke(
        &self,
        provider: &dyn GenerationProvider,
        prompt: &str,
    ) -> ProviderResult<String> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, provider.generate(prompt))
                .await
                .unwrap_or(Err(ProviderError::Timeout(provider.id()))),
            None => provider.generate(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deck::find_card;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Test adapter with configurable outcome.
    struct MockProvider {
        outcome: Result<String, ProviderError>,
        latency: Duration,
        calls: AtomicU32,
    }

    impl MockProvider {
        fn succeeding(artifact: &str) -> Self {
            Self {
                outcome: Ok(artifact.to_string()),
                latency: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn failing(error: ProviderError) -> Self {
            Self {
                outcome: Err(error),
                latency: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }
    }

    #[async_trait]
    impl GenerationProvider for MockProvider {
        fn id(&self) -> &'static str {
            "mock"
        }

        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.outcome.clone()
        }
    }

    fn fool_image_request() -> GenerationRequest {
        GenerationRequest::image_for(find_card("The Fool").unwrap())
    }

    #[tokio::test]
    async fn test_success_is_not_degraded() {
        let engine = GenerationEngine::new();
        let provider = Arc::new(MockProvider::succeeding("https://img.example/fool.png"));
        let result = engine.generate_with(provider, &fool_image_request()).await;
        assert!(!result.degraded);
        assert_eq!(result.provider, "mock");
        assert_eq!(result.artifact, "https://img.example/fool.png");
    }

    #[tokio::test]
    async fn test_every_error_kind_falls_back() {
        let errors = [
            ProviderError::Auth("mock"),
            ProviderError::RateLimited("mock"),
            ProviderError::Malformed("mock"),
            ProviderError::Network("mock"),
            ProviderError::Timeout("mock"),
        ];
        let engine = GenerationEngine::new();
        for error in errors {
            let kind = error.kind();
            let provider = Arc::new(MockProvider::failing(error));
            let result = engine.generate_with(provider, &fool_image_request()).await;
            assert!(result.degraded, "no fallback for {kind}");
            assert_eq!(result.provider, FALLBACK_PROVIDER);
            assert!(!result.artifact.is_empty());
        }
    }

    #[tokio::test]
    async fn test_fallback_artifact_names_the_card() {
        let engine = GenerationEngine::new();
        let provider = Arc::new(MockProvider::failing(ProviderError::Network("mock")));
        let result = engine.generate_with(provider, &fool_image_request()).await;
        assert!(result.degraded);
        assert!(result.artifact.contains("The Fool"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_degrades() {
        // Scenario: provider endpoint refuses connections entirely.
        let config = ProviderConfig::OpenAi {
            api_key: "sk-test".to_string(),
            model: "dall-e-3".to_string(),
            quality: QualityTier::Hd,
            base_url: Some("http://127.0.0.1:9".to_string()),
        };
        let engine = GenerationEngine::new();
        let result = engine.generate(&fool_image_request(), &config).await;
        assert!(result.degraded);
        assert!(result.artifact.contains("The Fool"));
    }

    #[tokio::test]
    async fn test_deadline_elapse_degrades() {
        let engine = GenerationEngine::new().with_deadline(Duration::from_millis(10));
        let provider = Arc::new(
            MockProvider::succeeding("late").with_latency(Duration::from_secs(5)),
        );
        let result = engine.generate_with(provider, &fool_image_request()).await;
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_adapter_invoked_exactly_once() {
        let engine = GenerationEngine::new();
        let provider = Arc::new(MockProvider::failing(ProviderError::RateLimited("mock")));
        engine
            .generate_with(provider.clone(), &fool_image_request())
            .await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_text_fallback_is_a_complete_reading() {
        let card = find_card("The Fool").unwrap();
        let request = GenerationRequest::reading_for(card, ReadingContext::default());
        let engine = GenerationEngine::new();
        let provider = Arc::new(MockProvider::failing(ProviderError::Timeout("mock")));
        let result = engine.generate_with(provider, &request).await;
        assert!(result.degraded);
        // A coherent narrative, not an error message.
        assert!(result.artifact.contains("The Fool"));
        assert!(result.artifact.contains("Luna"));
        assert!(!result.artifact.to_lowercase().contains("error"));
    }
}
