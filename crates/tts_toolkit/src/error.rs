//! Speech synthesis errors

use thiserror::Error;

/// Errors that can occur while turning text into an audio file
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The configured provider name is not one of the known backends
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The selected provider requires an API key but none was configured
    #[error("{provider} TTS requires an API key")]
    MissingCredential {
        /// Provider that rejected the call
        provider: &'static str,
    },

    /// Edge synthesis failed on every attempt
    #[error("Edge TTS failed after {attempts} attempts: {message}")]
    EdgeSynthesis {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last underlying failure
        message: String,
    },

    /// OpenAI synthesis failed
    #[error("OpenAI TTS failed: {0}")]
    OpenAISynthesis(String),

    /// ElevenLabs synthesis failed
    #[error("ElevenLabs TTS failed: {0}")]
    ElevenLabsSynthesis(String),

    /// The request itself is unusable (e.g. empty text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SpeechError {
    /// Whether the error was raised before any network traffic took place
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider(_)
                | Self::MissingCredential { .. }
                | Self::InvalidInput(_)
                | Self::Configuration(_)
        )
    }
}
