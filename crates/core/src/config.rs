use config::{Config, ConfigError, Environment, File, FileFormat};
use secrecy::Secret;
use serde::Deserialize;

use crate::types::{AudioEncoding, Position, SignalLocation};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub speech: SpeechConfig,
    pub proximity: ProximityConfig,
    pub telemetry: TelemetryConfig,
    pub signals: Vec<SignalLocation>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            allowed_origins: vec!["*".into()],
        }
    }
}

/// Cloud Text-to-Speech settings. The voice is fixed per deployment.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub api_key: Option<Secret<String>>,
    /// OAuth bearer token, used when no API key is configured.
    pub access_token: Option<Secret<String>>,
    pub language_code: String,
    pub voice_name: String,
    pub audio_encoding: AudioEncoding,
    pub timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com/v1/text:synthesize".into(),
            api_key: None,
            access_token: None,
            language_code: "pt-BR".into(),
            voice_name: "pt-BR-Standard-A".into(),
            audio_encoding: AudioEncoding::Mp3,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProximityConfig {
    pub tick_interval_ms: u64,
    pub throttle_ms: u64,
    /// Rounded-distance delta above which a new alert replaces the held one.
    pub significant_change_m: u32,
    pub default_position: Position,
    pub tiers: TierThresholds,
    pub cadence: SpeakCadence,
    pub normal_delivery: Delivery,
    pub urgent_delivery: Delivery,
    pub urgent_prefix: String,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            throttle_ms: 2_000,
            significant_change_m: 2,
            // Dourados-MS
            default_position: Position::new(-22.2231, -54.8124),
            tiers: TierThresholds::default(),
            cadence: SpeakCadence::default(),
            normal_delivery: Delivery::default(),
            urgent_delivery: Delivery {
                speaking_rate: 1.25,
                pitch: 4.0,
            },
            urgent_prefix: "Warning! ".into(),
        }
    }
}

/// Strict upper bounds, in meters, for each tier.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TierThresholds {
    pub very_near_m: f64,
    pub near_m: f64,
    pub approaching_m: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            very_near_m: 5.0,
            near_m: 10.0,
            approaching_m: 50.0,
        }
    }
}

/// Rounded distance must be a multiple of these to re-announce in a tier.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SpeakCadence {
    pub near_every_m: u32,
    pub approaching_every_m: u32,
    pub distant_every_m: u32,
}

impl Default for SpeakCadence {
    fn default() -> Self {
        Self {
            near_every_m: 5,
            approaching_every_m: 10,
            distant_every_m: 25,
        }
    }
}

/// Voice delivery for an utterance. Missing fields fall back to a neutral
/// voice.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Delivery {
    pub speaking_rate: f32,
    /// Semitones.
    pub pitch: f32,
}

impl Default for Delivery {
    fn default() -> Self {
        Self {
            speaking_rate: 1.0,
            pitch: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub enable_metrics: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("SAFECROSS_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a TOML document, filling gaps with defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
