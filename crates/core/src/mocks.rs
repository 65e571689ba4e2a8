//! Mock implementations of core traits for testing.
//!
//! These are shared by the unit and integration tests of every crate in the
//! workspace.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{AudioSink, SpeechSynthesizer, Speaker},
    types::{AudioEncoding, SynthesisRequest, SynthesizedAudio, Utterance},
    Error, Result,
};

/// A few bytes that start with an MPEG frame sync.
pub const FAKE_MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x0F, 0xF0, 0x00];

// =============================================================================
// Mock Speech Synthesizer
// =============================================================================

enum Outcome {
    Audio(Bytes),
    BackendError(String),
    Rejected(String),
}

/// Synthesizer that returns canned audio or a canned failure.
pub struct MockSynthesizer {
    outcome: Outcome,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockSynthesizer {
    /// Always succeed with the given audio.
    pub fn returning(audio: impl Into<Bytes>) -> Self {
        Self::with_outcome(Outcome::Audio(audio.into()))
    }

    /// Always succeed with a short MP3 payload.
    pub fn mp3() -> Self {
        Self::returning(Bytes::from_static(FAKE_MP3))
    }

    /// Always fail with a speech backend error.
    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Outcome::BackendError(message.to_string()))
    }

    /// Always fail with an invalid request error, as a chained gateway
    /// rejecting the text would.
    pub fn rejecting(message: &str) -> Self {
        Self::with_outcome(Outcome::Rejected(message.to_string()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Outcome::Audio(bytes) => Ok(SynthesizedAudio {
                bytes: bytes.clone(),
                encoding: AudioEncoding::Mp3,
            }),
            Outcome::BackendError(msg) => Err(Error::speech_backend(msg.clone())),
            Outcome::Rejected(msg) => Err(Error::invalid_request(msg.clone())),
        }
    }
}

// =============================================================================
// Mock Speaker
// =============================================================================

/// Speaker that records utterances and optionally takes time to "speak".
///
/// Utterances are recorded when speaking starts; `finished` only counts the
/// ones that ran to the end.
#[derive(Default)]
pub struct MockSpeaker {
    spoken: Mutex<Vec<Utterance>>,
    finished: AtomicUsize,
    duration: Duration,
    fail: bool,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each utterance takes `duration` to finish.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Every call records the utterance and then fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.spoken.lock().unwrap().len()
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance.clone());
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::playback("mock speaker failure"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock Audio Sink
// =============================================================================

/// Audio sink that keeps everything it was asked to play.
#[derive(Default)]
pub struct MockAudioSink {
    played: Mutex<Vec<SynthesizedAudio>>,
}

impl MockAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<SynthesizedAudio> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSink for MockAudioSink {
    async fn play(&self, audio: SynthesizedAudio) -> Result<()> {
        self.played.lock().unwrap().push(audio);
        Ok(())
    }
}
