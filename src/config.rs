//! Application Configuration
//!
//! Settings resolve from an optional TOML file overlaid with process
//! environment variables. Provider credentials come from one
//! environment variable per provider id and are never written back to
//! disk.

use crate::core::generation::providers::{find_provider_meta, ConfigError, ProviderConfig};
use crate::core::generation::QualityTier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    /// Credentials are env-only: loaded from the environment, skipped
    /// on serialization so they cannot land in a config file.
    #[serde(skip_serializing)]
    pub credentials: Credentials,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8788 }
    }
}

/// Generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Image provider assumed when a request does not name one.
    pub default_provider: String,
    /// Provider used for reading interpretation.
    pub text_provider: String,
    /// Model overrides; provider defaults apply when unset.
    pub image_model: Option<String>,
    pub text_model: Option<String>,
    pub quality: QualityTier,
    /// Base URL override for OpenAI-compatible endpoints.
    pub api_base: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            text_provider: "openai".to_string(),
            image_model: None,
            text_model: None,
            quality: QualityTier::Hd,
            api_base: None,
        }
    }
}

/// One credential per provider id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub stability_api_key: Option<String>,
    pub replicate_api_token: Option<String>,
    pub deepseek_api_key: Option<String>,
}

impl Settings {
    /// Load configuration from `arcana.toml` (or `$ARCANA_CONFIG`) and
    /// overlay environment variables. Returns defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        let mut settings = match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded config from {}", config_path.display());
                    settings
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        };
        settings.apply_env();
        settings
    }

    fn config_path() -> PathBuf {
        std::env::var("ARCANA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("arcana.toml"))
    }

    fn apply_env(&mut self) {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        if let Some(key) = env("OPENAI_API_KEY") {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(key) = env("STABILITY_API_KEY") {
            self.credentials.stability_api_key = Some(key);
        }
        if let Some(token) = env("REPLICATE_API_TOKEN") {
            self.credentials.replicate_api_token = Some(token);
        }
        if let Some(key) = env("DEEPSEEK_API_KEY") {
            self.credentials.deepseek_api_key = Some(key);
        }
        if let Some(base) = env("OPENAI_API_BASE") {
            self.generation.api_base = Some(base);
        }
        if let Some(model) = env("OPENAI_MODEL") {
            self.generation.text_model = Some(model);
        }
        if let Some(port) = env("ARCANA_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// The credential configured for a provider id, if any.
    pub fn credential_for(&self, provider_id: &str) -> Option<&str> {
        match provider_id {
            "openai" => self.credentials.openai_api_key.as_deref(),
            "stability" => self.credentials.stability_api_key.as_deref(),
            "replicate" => self.credentials.replicate_api_token.as_deref(),
            "deepseek" => self.credentials.deepseek_api_key.as_deref(),
            _ => None,
        }
    }

    /// Provider configuration for image generation. Fails fast on an
    /// unknown provider id or a missing credential.
    pub fn image_provider_config(&self, provider_id: &str) -> Result<ProviderConfig, ConfigError> {
        let meta = find_provider_meta(provider_id)
            .ok_or_else(|| ConfigError::UnknownProvider(provider_id.to_string()))?;
        let credential = self
            .credential_for(meta.id)
            .ok_or(ConfigError::MissingCredential(meta.id))?;

        let mut config = ProviderConfig::from_parts(
            meta.id,
            credential,
            self.generation.image_model.as_deref(),
            self.generation.quality,
        )?;
        if let ProviderConfig::OpenAi { base_url, .. } = &mut config {
            base_url.clone_from(&self.generation.api_base);
        }
        Ok(config)
    }

    /// Provider configuration for reading interpretation.
    pub fn text_provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let provider_id = self.generation.text_provider.as_str();
        let meta = find_provider_meta(provider_id)
            .ok_or_else(|| ConfigError::UnknownProvider(provider_id.to_string()))?;
        let credential = self
            .credential_for(meta.id)
            .ok_or(ConfigError::MissingCredential(meta.id))?;

        let mut config = ProviderConfig::from_parts(
            meta.id,
            credential,
            self.generation.text_model.as_deref(),
            self.generation.quality,
        )?;
        if let ProviderConfig::OpenAi { base_url, model, .. } = &mut config {
            base_url.clone_from(&self.generation.api_base);
            // The images default is wrong for chat; fall back to a chat
            // model when no text model is configured.
            if self.generation.text_model.is_none() {
                *model = "gpt-4o".to_string();
            }
        }
        Ok(config)
    }
}
