//! Generation Request and Result Types
//!
//! Core types shared by the prompt composer, the provider adapters, and
//! the orchestration engine.

use crate::core::deck::{Arcana, Element, TarotCard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Requests
// ============================================================================

/// What kind of artifact a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// An interpretive reading (chat completion).
    Text,
    /// Card art (image generation).
    Image,
}

/// Context carried by a reading request: the question, the spread, and
/// the querent. Consumed only by text prompt composition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingContext {
    pub question: String,
    pub spread: String,
    /// One line per position: "Position 1: The Fool - new beginnings ..."
    pub card_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub querent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zodiac_sign: Option<String>,
    /// Date of the querent's most recent previous reading, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reading_date: Option<String>,
}

/// A single generation request. Immutable once built: every field is set
/// at construction and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub card_name: String,
    pub arcana: Arcana,
    pub meaning: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zodiac_sign: Option<String>,
    pub kind: ArtifactKind,
    /// Present on text requests assembled from a full spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<ReadingContext>,
}

impl GenerationRequest {
    /// Card art request for a single card.
    pub fn image_for(card: &TarotCard) -> Self {
        Self {
            card_name: card.name.clone(),
            arcana: card.arcana,
            meaning: card.meaning.clone(),
            keywords: card.keywords.clone(),
            element: card.element,
            zodiac_sign: card.astrology.clone(),
            kind: ArtifactKind::Image,
            reading: None,
        }
    }

    /// Reading request anchored on the primary (first drawn) card, with
    /// the full spread breakdown carried in `context`.
    pub fn reading_for(card: &TarotCard, context: ReadingContext) -> Self {
        Self {
            card_name: card.name.clone(),
            arcana: card.arcana,
            meaning: card.meaning.clone(),
            keywords: card.keywords.clone(),
            element: card.element,
            zodiac_sign: card.astrology.clone(),
            kind: ArtifactKind::Text,
            reading: Some(context),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// A finished artifact. `artifact` is a URL or an embedded `data:` URI;
/// `degraded` marks a locally synthesized fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub artifact: String,
    pub provider: String,
    pub degraded: bool,
}

impl GenerationResult {
    pub fn from_provider(provider: &str, artifact: String) -> Self {
        Self {
            artifact,
            provider: provider.to_string(),
            degraded: false,
        }
    }
}

// ============================================================================
// Provider Errors
// ============================================================================

/// Normalized provider failure. Carries only the provider id and the
/// failure kind so that raw response bodies and credentials can never
/// travel past the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{0}: authentication rejected")]
    Auth(&'static str),

    #[error("{0}: rate limited")]
    RateLimited(&'static str),

    #[error("{0}: malformed response")]
    Malformed(&'static str),

    #[error("{0}: network failure")]
    Network(&'static str),

    #[error("{0}: timed out")]
    Timeout(&'static str),
}

impl ProviderError {
    /// The provider that produced this error.
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Auth(p)
            | ProviderError::RateLimited(p)
            | ProviderError::Malformed(p)
            | ProviderError::Network(p)
            | ProviderError::Timeout(p) => p,
        }
    }

    /// Coarse kind tag, safe for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Auth(_) => "auth",
            ProviderError::RateLimited(_) => "rate-limited",
            ProviderError::Malformed(_) => "malformed",
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
        }
    }

    /// Map a non-success HTTP status to the nearest error kind.
    pub fn from_status(provider: &'static str, status: u16) -> Self {
        match status {
            401 | 403 => ProviderError::Auth(provider),
            429 => ProviderError::RateLimited(provider),
            _ => ProviderError::Malformed(provider),
        }
    }

    /// Map a transport-level failure to the nearest error kind.
    pub fn from_transport(provider: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(provider)
        } else {
            ProviderError::Network(provider)
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// ============================================================================
// Polling
// ============================================================================

/// Lifecycle record for one asynchronous submission. Created when the
/// provider accepts a job, ticked once per status check, dropped on any
/// terminal outcome.
#[derive(Debug, Clone)]
pub struct PollingJob {
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl PollingJob {
    pub fn new(job_id: String, max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            job_id,
            submitted_at: Utc::now(),
            attempts_made: 0,
            max_attempts,
            poll_interval,
        }
    }

    /// Record one status check. Attempts never exceed the ceiling.
    pub fn record_attempt(&mut self) {
        debug_assert!(self.attempts_made < self.max_attempts);
        self.attempts_made += 1;
    }

    pub fn exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    /// Upper bound on how long this job may poll.
    pub fn budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}
