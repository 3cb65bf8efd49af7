//! HTTP API Service
//!
//! Exposes the two generation operations to the UI layer:
//!
//! ## Endpoints
//! - `POST /api/reading` - draw a spread and generate its interpretation
//! - `POST /api/image` - generate card art for one card
//! - `GET /api/luna` - greeting, daily insight, and available spreads
//! - `GET /health` - health check
//!
//! Validation and configuration errors surface here with enough detail
//! to fix the request; provider failures never do - generation degrades
//! to a synthesized artifact instead.

use crate::config::Settings;
use crate::core::deck::{default_spread, find_spread, Arcana, Element, SPREADS};
use crate::core::generation::types::{ArtifactKind, GenerationRequest};
use crate::core::generation::{GenerationEngine, DEFAULT_PROVIDER};
use crate::core::reading::{
    daily_insight, draw_spread, personalized_greeting, reading_context, TarotReading,
    UserProfile,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingApiRequest {
    #[serde(default)]
    question: Option<String>,
    #[serde(default = "default_spread_type")]
    spread_type: String,
    #[serde(default)]
    user_profile: UserProfile,
}

fn default_spread_type() -> String {
    "threeCard".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CardPayload {
    card_name: String,
    arcana: Option<Arcana>,
    meaning: String,
    keywords: Vec<String>,
    element: Option<Element>,
    zodiac_sign: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageApiRequest {
    card: Option<CardPayload>,
    provider: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LunaQuery {
    user_profile: Option<String>,
}

// ============================================================================
// Service
// ============================================================================

/// Shared handler state.
pub struct ApiState {
    pub settings: Settings,
    pub engine: GenerationEngine,
}

/// The HTTP API service. Binds on start, drains on graceful shutdown.
pub struct ApiService {
    port: u16,
    state: Arc<ApiState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiService {
    pub fn new(settings: Settings) -> Self {
        let port = settings.server.port;
        Self {
            port,
            state: Arc::new(ApiState {
                settings,
                engine: GenerationEngine::new(),
            }),
            shutdown_tx: None,
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Start the API service.
    pub async fn start(&mut self) -> Result<(), String> {
        if self.shutdown_tx.is_some() {
            return Err("API service already running".to_string());
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let app = router(self.state.clone());
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| format!("Failed to bind API service to {}: {}", addr, e))?;

        tokio::spawn(async move {
            log::info!("API service started on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    log::info!("API service shutting down");
                })
                .await
                .ok();
        });

        self.shutdown_tx = Some(shutdown_tx);
        Ok(())
    }

    /// Stop the API service.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            log::info!("API service stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

/// Build the router. Separated from the service so tests can drive
/// handlers without binding a socket.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/reading", post(generate_reading))
        .route("/api/image", post(generate_image))
        .route("/api/luna", get(luna_info))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ============================================================================
// HTTP Handlers
// ============================================================================

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Draw a spread for the question and generate its interpretation.
async fn generate_reading(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ReadingApiRequest>,
) -> Response {
    let question = request.question.unwrap_or_default();
    if question.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Question is required");
    }

    // Configuration failures fail fast; no cards are drawn and no
    // provider is contacted.
    let config = match state.settings.text_provider_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Reading generation unavailable: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let spread = find_spread(&request.spread_type).unwrap_or_else(default_spread);
    let (cards, reversed) = draw_spread(spread);
    let context = reading_context(&question, spread, &cards, &request.user_profile);
    let generation = GenerationRequest::reading_for(&cards[0], context);

    let result = state.engine.generate(&generation, &config).await;
    let reading = TarotReading::assemble(question, spread, cards, reversed, result.artifact);

    Json(serde_json::json!({
        "success": true,
        "reading": reading,
        "spread": spread.positions,
    }))
    .into_response()
}

/// Generate card art for one card through the requested provider.
async fn generate_image(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ImageApiRequest>,
) -> Response {
    let card = match request.card {
        Some(card) if !card.card_name.trim().is_empty() => card,
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Missing required card information")
        }
    };

    let provider_id = request
        .provider
        .unwrap_or_else(|| state.settings.generation.default_provider.clone());
    let provider_id = if provider_id.is_empty() {
        DEFAULT_PROVIDER.to_string()
    } else {
        provider_id
    };

    let config = match state.settings.image_provider_config(&provider_id) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Image generation unavailable for {}: {}", provider_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let generation = GenerationRequest {
        card_name: card.card_name.clone(),
        arcana: card.arcana.unwrap_or(Arcana::Minor),
        meaning: card.meaning,
        keywords: card.keywords,
        element: card.element,
        zodiac_sign: card.zodiac_sign,
        kind: ArtifactKind::Image,
        reading: None,
    };

    // Never an error past this point: provider failures degrade.
    let result = state.engine.generate(&generation, &config).await;

    Json(serde_json::json!({
        "success": true,
        "imageUrl": result.artifact,
        "card": card.card_name,
    }))
    .into_response()
}

/// Luna's greeting, a daily insight, and the available spreads.
async fn luna_info(Query(query): Query<LunaQuery>) -> Response {
    let profile: UserProfile = query
        .user_profile
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    let spreads: Vec<serde_json::Value> = SPREADS
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "name": s.name,
                "description": s.description,
                "positions": s.positions,
            })
        })
        .collect();

    Json(serde_json::json!({
        "success": true,
        "greeting": personalized_greeting(&profile),
        "dailyInsight": daily_insight(),
        "availableSpreads": spreads,
    }))
    .into_response()
}
