//! Generation Provider Implementations
//!
//! Concrete implementations of the `GenerationProvider` trait for all
//! supported external services, plus the canonical provider metadata
//! table and the `ProviderConfig` selector.
//!
//! Adding a new provider requires:
//! 1. A new variant in `ProviderConfig`
//! 2. A new entry in `PROVIDERS`
//! 3. The provider implementation file

mod openai;
mod replicate;
mod stability;

pub use openai::{ChatCompletionProvider, OpenAiImageProvider};
pub use replicate::ReplicateProvider;
pub use stability::StabilityProvider;

use super::types::{ArtifactKind, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// One external generative service behind a normalized contract. The
/// returned string is the artifact locator: a hosted URL or an embedded
/// `data:` URI.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

/// HTTP client shared setup for all adapters.
pub(super) fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

// ── Provider metadata ───────────────────────────────────────────────────────

/// Static metadata for a known provider. Single source of truth for
/// provider ids and credential resolution.
#[derive(Clone, Debug)]
pub struct ProviderMeta {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Environment variable holding this provider's credential.
    pub credential_env: &'static str,
    pub default_model: Option<&'static str>,
}

/// Canonical table of all known providers.
pub const PROVIDERS: &[ProviderMeta] = &[
    ProviderMeta {
        id: "openai",
        display_name: "OpenAI (DALL-E)",
        credential_env: "OPENAI_API_KEY",
        default_model: Some("dall-e-3"),
    },
    ProviderMeta {
        id: "stability",
        display_name: "Stability AI",
        credential_env: "STABILITY_API_KEY",
        default_model: None,
    },
    ProviderMeta {
        id: "replicate",
        display_name: "Replicate (SDXL)",
        credential_env: "REPLICATE_API_TOKEN",
        default_model: None,
    },
    ProviderMeta {
        id: "deepseek",
        display_name: "DeepSeek",
        credential_env: "DEEPSEEK_API_KEY",
        default_model: Some("deepseek-chat"),
    },
];

/// Provider assumed when a request does not name one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Look up a provider's metadata by id.
pub fn find_provider_meta(id: &str) -> Option<&'static ProviderMeta> {
    PROVIDERS.iter().find(|p| p.id == id)
}

// ── Configuration errors ────────────────────────────────────────────────────

/// Boundary-level configuration failures. These fail fast and are never
/// retried and never fall back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No API key configured for provider: {0}")]
    MissingCredential(&'static str),

    #[error("Provider {provider} does not support {kind} generation")]
    Unsupported {
        provider: &'static str,
        kind: &'static str,
    },
}

// ── ProviderConfig ──────────────────────────────────────────────────────────

/// Requested output fidelity, where the provider protocol supports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Standard,
    #[default]
    Hd,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Standard => "standard",
            QualityTier::Hd => "hd",
        }
    }
}

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Configuration for creating providers. The credential is read-only
/// after construction and is never logged or persisted with the secret
/// in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProviderConfig {
    OpenAi {
        api_key: String,
        model: String,
        quality: QualityTier,
        /// Override for OpenAI-compatible endpoints.
        base_url: Option<String>,
    },
    Stability {
        api_key: String,
    },
    Replicate {
        api_token: String,
    },
    /// Shares the OpenAI request shape against a distinct base endpoint.
    DeepSeek {
        api_key: String,
        model: String,
        base_url: String,
    },
}

impl ProviderConfig {
    /// Build a `ProviderConfig` from parts. The single id-to-variant
    /// mapping point: unknown ids and empty credentials fail here, at
    /// the boundary, before any engine call.
    pub fn from_parts(
        provider_id: &str,
        credential: &str,
        model: Option<&str>,
        quality: QualityTier,
    ) -> Result<Self, ConfigError> {
        let meta = find_provider_meta(provider_id)
            .ok_or_else(|| ConfigError::UnknownProvider(provider_id.to_string()))?;
        if credential.is_empty() {
            return Err(ConfigError::MissingCredential(meta.id));
        }

        let model = model
            .or(meta.default_model)
            .unwrap_or_default()
            .to_string();

        Ok(match meta.id {
            "openai" => ProviderConfig::OpenAi {
                api_key: credential.to_string(),
                model,
                quality,
                base_url: None,
            },
            "stability" => ProviderConfig::Stability {
                api_key: credential.to_string(),
            },
            "replicate" => ProviderConfig::Replicate {
                api_token: credential.to_string(),
            },
            "deepseek" => ProviderConfig::DeepSeek {
                api_key: credential.to_string(),
                model,
                base_url: DEEPSEEK_BASE_URL.to_string(),
            },
            _ => unreachable!("id came from PROVIDERS"),
        })
    }

    /// Get the provider id for this configuration.
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::Stability { .. } => "stability",
            ProviderConfig::Replicate { .. } => "replicate",
            ProviderConfig::DeepSeek { .. } => "deepseek",
        }
    }

    /// The credential carried by this configuration.
    pub fn credential(&self) -> &str {
        match self {
            ProviderConfig::OpenAi { api_key, .. }
            | ProviderConfig::Stability { api_key }
            | ProviderConfig::DeepSeek { api_key, .. } => api_key,
            ProviderConfig::Replicate { api_token } => api_token,
        }
    }

    /// Return a clone safe for disk persistence (credential stripped).
    pub fn without_secret(&self) -> Self {
        let mut stripped = self.clone();
        match &mut stripped {
            ProviderConfig::OpenAi { api_key, .. }
            | ProviderConfig::Stability { api_key }
            | ProviderConfig::DeepSeek { api_key, .. } => api_key.clear(),
            ProviderConfig::Replicate { api_token } => api_token.clear(),
        }
        stripped
    }

    /// Whether this provider can serve the requested artifact kind.
    pub fn supports(&self, kind: ArtifactKind) -> bool {
        match (self, kind) {
            (ProviderConfig::OpenAi { .. }, _) => true,
            (ProviderConfig::DeepSeek { .. }, _) => true,
            (ProviderConfig::Stability { .. }, ArtifactKind::Image) => true,
            (ProviderConfig::Replicate { .. }, ArtifactKind::Image) => true,
            _ => false,
        }
    }

    /// Create the adapter for this configuration and artifact kind.
    pub fn create_provider(
        &self,
        kind: ArtifactKind,
    ) -> Result<Arc<dyn GenerationProvider>, ConfigError> {
        match (self, kind) {
            (
                ProviderConfig::OpenAi {
                    api_key,
                    model,
                    quality,
                    base_url,
                },
                ArtifactKind::Image,
            ) => {
                let mut provider =
                    OpenAiImageProvider::new(api_key.clone(), model.clone(), *quality);
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base.clone());
                }
                Ok(Arc::new(provider))
            }
            (
                ProviderConfig::OpenAi {
                    api_key,
                    model,
                    base_url,
                    ..
                },
                ArtifactKind::Text,
            ) => {
                let mut provider =
                    ChatCompletionProvider::new("openai", api_key.clone(), model.clone());
                if let Some(base) = base_url {
                    provider = provider.with_base_url(base.clone());
                }
                Ok(Arc::new(provider))
            }
            (
                ProviderConfig::DeepSeek {
                    api_key,
                    model,
                    base_url,
                },
                ArtifactKind::Text,
            ) => Ok(Arc::new(
                ChatCompletionProvider::new("deepseek", api_key.clone(), model.clone())
                    .with_base_url(base_url.clone()),
            )),
            (
                ProviderConfig::DeepSeek {
                    api_key, base_url, ..
                },
                ArtifactKind::Image,
            ) => Ok(Arc::new(
                OpenAiImageProvider::for_deepseek(api_key.clone(), base_url.clone()),
            )),
            (ProviderConfig::Stability { api_key }, ArtifactKind::Image) => {
                Ok(Arc::new(StabilityProvider::new(api_key.clone())))
            }
            (ProviderConfig::Replicate { api_token }, ArtifactKind::Image) => {
                Ok(Arc::new(ReplicateProvider::new(api_token.clone())))
            }
            (config, ArtifactKind::Text) => Err(ConfigError::Unsupported {
                provider: config.provider_id(),
                kind: "text",
            }),
        }
    }
}
