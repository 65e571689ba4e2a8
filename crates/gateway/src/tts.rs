//! Google Cloud Text-to-Speech client.
//!
//! Uses the REST `text:synthesize` method. The voice (language, name,
//! encoding) is fixed by configuration; callers only choose the text and,
//! optionally, speaking rate and pitch.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use safecross_core::{
    config::SpeechConfig, Error, Result, SpeechSynthesizer, SynthesisRequest, SynthesizedAudio,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

const RATE_RANGE: (f32, f32) = (0.25, 4.0);
const PITCH_RANGE: (f32, f32) = (-20.0, 20.0);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaking_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pitch: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Speech synthesizer backed by Google Cloud Text-to-Speech.
pub struct GoogleTtsClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl GoogleTtsClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Whether an API key or access token is configured.
    pub fn has_credentials(&self) -> bool {
        self.config.api_key.is_some() || self.config.access_token.is_some()
    }

    fn body<'a>(&'a self, request: &'a SynthesisRequest) -> SynthesizeBody<'a> {
        SynthesizeBody {
            input: TextInput {
                text: &request.text,
            },
            voice: VoiceSelection {
                language_code: &self.config.language_code,
                name: &self.config.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: self.config.audio_encoding.api_name(),
                speaking_rate: request
                    .speaking_rate
                    .map(|r| r.clamp(RATE_RANGE.0, RATE_RANGE.1)),
                pitch: request.pitch.map(|p| p.clamp(PITCH_RANGE.0, PITCH_RANGE.1)),
            },
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        if let Some(key) = &self.config.api_key {
            Ok(builder.query(&[("key", key.expose_secret().as_str())]))
        } else if let Some(token) = &self.config.access_token {
            Ok(builder.bearer_auth(token.expose_secret()))
        } else {
            Err(Error::speech_backend(
                "No credentials configured for the speech backend",
            ))
        }
    }
}

/// Turn a `text:synthesize` response body into audio bytes.
fn decode_audio(body: &[u8]) -> Result<Bytes> {
    let response: SynthesizeResponse = serde_json::from_slice(body)
        .map_err(|e| Error::speech_backend(format!("Malformed backend response: {}", e)))?;

    let content = response
        .audio_content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::speech_backend("No audio content received from the backend"))?;

    let audio = base64::engine::general_purpose::STANDARD
        .decode(content.as_bytes())
        .map_err(|e| Error::speech_backend(format!("Invalid audio content encoding: {}", e)))?;

    Ok(Bytes::from(audio))
}

/// Best human-readable message for a failed call.
fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{} ({}): {}", status.as_u16(), code, envelope.error.message),
            None => format!("{}: {}", status.as_u16(), envelope.error.message),
        },
        Err(_) => format!("Backend returned {}", status),
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let builder = self
            .client
            .post(&self.config.endpoint)
            .json(&self.body(request));
        let builder = self.authorize(builder)?;

        tracing::debug!(
            chars = request.text.chars().count(),
            voice = %self.config.voice_name,
            "Synthesizing speech"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| Error::speech_backend(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::speech_backend(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(status = status.as_u16(), message = %message, "Speech backend rejected request");
            return Err(Error::speech_backend(message));
        }

        let bytes = decode_audio(&body)?;
        Ok(SynthesizedAudio {
            bytes,
            encoding: self.config.audio_encoding,
        })
    }
}
