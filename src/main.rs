#![deny(unused)]
//! SafeCross - voice alerts for pedestrians approaching traffic signals.
//!
//! Runs the speech gateway: a text-to-speech proxy plus the configured
//! signal list and a stateless proximity check.

use std::sync::Arc;

use safecross_core::config::AppConfig;
use safecross_core::SpeechSynthesizer;
use safecross_gateway::{GatewayConfig, GatewayServer, GoogleTtsClient};
use safecross_proximity::ProximityMonitor;
use secrecy::Secret;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;

    safecross_gateway::configure_tracing(config.telemetry.json_logs)?;
    tracing::info!("Starting SafeCross v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Speech backend
    // =========================================================================
    if config.speech.api_key.is_none() {
        if let Ok(key) = std::env::var("GOOGLE_TTS_API_KEY") {
            config.speech.api_key = Some(Secret::new(key));
        }
    }
    let tts = GoogleTtsClient::new(config.speech.clone())?;
    if !tts.has_credentials() {
        tracing::warn!("No speech credentials configured; /api/tts will answer 500");
    }
    tracing::info!(
        language = %config.speech.language_code,
        voice = %config.speech.voice_name,
        "Speech backend initialized"
    );
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(tts);

    // =========================================================================
    // Signals
    // =========================================================================
    if config.signals.is_empty() {
        tracing::warn!("No signal locations configured; proximity checks will report no alert");
    }
    let monitor = ProximityMonitor::new(config.proximity.clone(), config.signals.clone());
    tracing::info!(signals = monitor.signals().len(), "Signal locations loaded");

    // =========================================================================
    // Gateway
    // =========================================================================
    let gateway_config = GatewayConfig::from(&config.server);
    let mut server = GatewayServer::new(gateway_config.clone(), synthesizer, monitor);

    if config.telemetry.enable_metrics {
        server = server.with_metrics(safecross_gateway::setup_metrics_recorder()?);
    }

    tracing::info!(
        host = %gateway_config.host,
        port = gateway_config.port,
        "Endpoints: GET /health, POST /api/tts, GET /api/signals, POST /api/proximity"
    );

    server.run().await?;

    Ok(())
}
