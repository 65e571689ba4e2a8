//! Axum-based HTTP server for the gateway.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use safecross_core::{
    config::ServerConfig, Error, Position, Result, SignalLocation, SpeechSynthesizer,
    SynthesisRequest,
};
use safecross_proximity::{AlertState, ProximityMonitor};

use crate::telemetry::track_request;

/// Message returned when a synthesis request carries no text.
pub const MISSING_TEXT: &str = "Texto não fornecido";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
    /// Origins allowed by CORS; `*` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            enable_cors: true,
            enable_tracing: true,
            allowed_origins: server.allowed_origins.clone(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Speech backend.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Used statelessly, for the signal list and one-off assessments.
    pub monitor: ProximityMonitor,
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(
        config: GatewayConfig,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        monitor: ProximityMonitor,
    ) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                synthesizer,
                monitor,
            }),
            metrics_handle: None,
        }
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/api/tts", post(tts_handler))
            .route("/api/signals", get(signals_handler))
            .route("/api/proximity", post(proximity_handler))
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    fn cors_layer(&self) -> CorsLayer {
        let origin = if self.config.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            let origins: Vec<HeaderValue> = self
                .config
                .allowed_origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        };
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Run the server until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::gateway(format!("Failed to bind: {}", e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::gateway(format!("Server error: {}", e)))?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Speech synthesis request.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    /// Text to speak.
    #[serde(default)]
    pub text: Option<String>,
    /// Optional speaking rate (1.0 is normal).
    #[serde(default)]
    pub speaking_rate: Option<f32>,
    /// Optional pitch offset in semitones.
    #[serde(default)]
    pub pitch: Option<f32>,
}

/// Proximity check request. A missing coordinate means no fix.
#[derive(Debug, Default, Deserialize)]
pub struct ProximityRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Proximity check response.
#[derive(Debug, Serialize)]
pub struct ProximityResponse {
    /// Position the assessment used.
    pub position: Position,
    /// True when the default position replaced a missing fix.
    pub location_unavailable: bool,
    /// Nearest signal, if any are configured.
    pub alert: Option<AlertState>,
    /// What would be spoken for this alert.
    pub utterance: Option<String>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Speech synthesis handler.
///
/// Returns raw audio on success. Every synthesizer failure is a 500 and is
/// never retried here.
async fn tts_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TtsRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let trace_id = Uuid::new_v4().to_string();

    let response = synthesize(&state, &trace_id, payload).await;

    track_request(
        "POST",
        "/api/tts",
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

async fn synthesize(
    state: &AppState,
    trace_id: &str,
    payload: std::result::Result<Json<TtsRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!(trace_id = %trace_id, error = %rejection, "Rejected TTS body");
            return error_response(StatusCode::BAD_REQUEST, MISSING_TEXT);
        }
    };

    let text = match payload.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, MISSING_TEXT),
    };

    tracing::info!(
        trace_id = %trace_id,
        chars = text.chars().count(),
        "Processing TTS request"
    );

    let request = SynthesisRequest {
        text,
        speaking_rate: payload.speaking_rate,
        pitch: payload.pitch,
    };

    match state.synthesizer.synthesize(&request).await {
        Ok(audio) if audio.is_empty() => {
            tracing::error!(trace_id = %trace_id, "Speech backend returned no audio");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "No audio content received from the speech backend",
            )
        }
        Ok(audio) => {
            tracing::debug!(trace_id = %trace_id, bytes = audio.len(), "Speech synthesized");
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static(audio.encoding.mime_type()),
                    ),
                    (header::CONTENT_LENGTH, HeaderValue::from(audio.len())),
                ],
                audio.bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Speech synthesis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Configured signal locations.
async fn signals_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SignalLocation>> {
    Json(state.monitor.signals().to_vec())
}

/// One-off proximity assessment; carries no speak state between calls.
async fn proximity_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ProximityRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let fix = match (request.lat, request.lng) {
        (Some(lat), Some(lng)) => Some(Position::new(lat, lng)),
        _ => None,
    };
    let (position, location_unavailable) = state.monitor.resolve_position(fix);
    let alert = state.monitor.assess(position);
    let utterance = alert
        .as_ref()
        .map(|a| state.monitor.utterance_for(a).text);

    Json(ProximityResponse {
        position,
        location_unavailable,
        alert,
        utterance,
    })
    .into_response()
}
