//! Core traits for SafeCross.
//!
//! These traits sit at the seams between the proximity monitor, the speech
//! backends, and the platform's audio output.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{SynthesisRequest, SynthesizedAudio, Utterance};

/// Text-to-speech backend that turns text into encoded audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize the request into audio bytes.
    ///
    /// No retry is attempted; the caller decides whether to try again.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio>;
}

/// Anything that can deliver an utterance to the pedestrian.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak the utterance. Resolves once delivery has finished.
    async fn speak(&self, utterance: &Utterance) -> Result<()>;
}

/// Platform audio output.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play the audio, replacing whatever is currently playing.
    async fn play(&self, audio: SynthesizedAudio) -> Result<()>;
}
