//! Error types for SafeCross.

use thiserror::Error;

/// Result type alias using SafeCross's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SafeCross.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Gateway Errors
    // =========================================================================
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Speech Errors
    // =========================================================================
    #[error("Speech backend error: {0}")]
    SpeechBackend(String),

    #[error("Playback error: {0}")]
    Playback(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a gateway error.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a speech backend error.
    pub fn speech_backend(msg: impl Into<String>) -> Self {
        Self::SpeechBackend(msg.into())
    }

    /// Create a playback error.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::speech_backend("no audio content");
        assert_eq!(err.to_string(), "Speech backend error: no audio content");
    }
}
