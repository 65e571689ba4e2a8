use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Audio encodings the speech backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
    OggOpus,
}

impl AudioEncoding {
    /// Get the MIME type for this encoding.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::Linear16 => "audio/wav",
            AudioEncoding::OggOpus => "audio/ogg",
        }
    }

    /// Name used by the Cloud Text-to-Speech API.
    pub fn api_name(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
        }
    }

    /// Detect encoding from leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WAVE" {
            return Some(AudioEncoding::Linear16);
        }
        if data.starts_with(b"OggS") {
            return Some(AudioEncoding::OggOpus);
        }
        // ID3v2 tag or an MPEG frame sync
        if data.starts_with(b"ID3") || (data[0] == 0xFF && data[1] & 0xE0 == 0xE0) {
            return Some(AudioEncoding::Mp3);
        }

        None
    }
}

/// Text plus optional delivery parameters to synthesize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaking_rate: None,
            pitch: None,
        }
    }
}

/// Audio returned by a speech backend.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Bytes,
    pub encoding: AudioEncoding,
}

impl SynthesizedAudio {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A single spoken alert dispatched to a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    /// Very-near alerts interrupt and use faster, higher delivery.
    pub urgent: bool,
    pub speaking_rate: f32,
    /// Pitch offset in semitones.
    pub pitch: f32,
}

impl Utterance {
    pub fn to_synthesis_request(&self) -> SynthesisRequest {
        SynthesisRequest {
            text: self.text.clone(),
            speaking_rate: Some(self.speaking_rate),
            pitch: Some(self.pitch),
        }
    }
}
