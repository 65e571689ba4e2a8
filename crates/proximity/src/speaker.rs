//! Speaker implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use safecross_core::{
    AudioEncoding, AudioSink, Error, Result, SpeechSynthesizer, Speaker, SynthesisRequest,
    SynthesizedAudio, Utterance,
};
use serde::Deserialize;

/// Speaker for headless runs: the utterance only goes to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        tracing::info!(
            text = %utterance.text,
            urgent = utterance.urgent,
            rate = utterance.speaking_rate,
            pitch = utterance.pitch,
            "Speak"
        );
        Ok(())
    }
}

/// Synthesizes the utterance and plays the resulting audio.
pub struct SynthesizingSpeaker {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
}

impl SynthesizingSpeaker {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, sink: Arc<dyn AudioSink>) -> Self {
        Self { synthesizer, sink }
    }
}

#[async_trait]
impl Speaker for SynthesizingSpeaker {
    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        let audio = self
            .synthesizer
            .synthesize(&utterance.to_synthesis_request())
            .await?;
        if audio.is_empty() {
            return Err(Error::playback("Synthesizer returned an empty audio buffer"));
        }
        tracing::debug!(bytes = audio.len(), "Playing synthesized alert");
        self.sink.play(audio).await
    }
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: String,
}

/// Calls a SafeCross gateway's `/api/tts` endpoint.
pub struct GatewaySynthesizer {
    client: reqwest::Client,
    url: String,
}

impl GatewaySynthesizer {
    /// `base_url` is the gateway root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: format!("{}/api/tts", base_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SpeechSynthesizer for GatewaySynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::speech_backend(format!("Gateway unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<GatewayError>().await {
                Ok(body) => body.error,
                Err(_) => format!("Gateway returned {}", status),
            };
            return Err(if status.is_client_error() {
                Error::invalid_request(message)
            } else {
                Error::speech_backend(message)
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::speech_backend(format!("Failed to read audio: {}", e)))?;

        let encoding = AudioEncoding::detect(&bytes).unwrap_or_default();
        Ok(SynthesizedAudio { bytes, encoding })
    }
}
