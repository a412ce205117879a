//! Configuration for the speech dispatcher

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fallback voice when neither the call nor the instance names one
pub const DEFAULT_VOICE: &str = "zh-CN-XiaoyiNeural";
/// Fallback language
pub const DEFAULT_LANG: &str = "zh-CN";
/// Fallback Edge output format
pub const DEFAULT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";
/// Fallback for rate, pitch and volume
pub const DEFAULT_PROSODY: &str = "default";
/// Fallback number of Edge attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the speech dispatcher
///
/// Set once at construction; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Provider name (`edge`, `openai` or `elevenlabs`)
    ///
    /// Kept as a raw string: unknown names are accepted here and rejected
    /// when `speak` is called.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key for the paid providers
    #[serde(default)]
    pub api_key: Option<String>,

    /// Instance default voice
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Instance default language
    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Instance default Edge output format
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Edge read-aloud WebSocket endpoint
    #[serde(default = "default_edge_endpoint")]
    pub edge_endpoint: String,

    /// OpenAI API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// ElevenLabs API base URL
    #[serde(default = "default_elevenlabs_base_url")]
    pub elevenlabs_base_url: String,

    /// Per-attempt Edge timeout in milliseconds
    #[serde(default = "default_edge_timeout_ms")]
    pub edge_timeout_ms: u64,

    /// Edge backoff unit in milliseconds (attempt `n` waits `n` units)
    #[serde(default = "default_edge_backoff_ms")]
    pub edge_backoff_ms: u64,

    /// Request timeout for the HTTP providers (`None` keeps the client default)
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,
}

/// Known speech providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Free Microsoft Edge read-aloud service
    #[default]
    Edge,
    /// OpenAI speech endpoint
    OpenAI,
    /// ElevenLabs text-to-speech endpoint
    ElevenLabs,
}

impl Provider {
    /// Canonical configuration name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::OpenAI => "openai",
            Self::ElevenLabs => "elevenlabs",
        }
    }

    /// Human-readable name used in log lines and error messages
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Edge => "Edge",
            Self::OpenAI => "OpenAI",
            Self::ElevenLabs => "ElevenLabs",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edge" => Ok(Self::Edge),
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" => Ok(Self::ElevenLabs),
            other => Err(other.to_string()),
        }
    }
}

fn default_provider() -> String {
    Provider::Edge.as_str().to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_edge_endpoint() -> String {
    "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

const fn default_edge_timeout_ms() -> u64 {
    30_000
}

const fn default_edge_backoff_ms() -> u64 {
    1_000
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            default_voice: default_voice(),
            default_lang: default_lang(),
            default_format: default_format(),
            edge_endpoint: default_edge_endpoint(),
            openai_base_url: default_openai_base_url(),
            elevenlabs_base_url: default_elevenlabs_base_url(),
            edge_timeout_ms: default_edge_timeout_ms(),
            edge_backoff_ms: default_edge_backoff_ms(),
            http_timeout_ms: None,
        }
    }
}

impl TtsConfig {
    /// Configuration for the free Edge provider
    #[must_use]
    pub fn edge() -> Self {
        Self::default()
    }

    /// Configuration for the OpenAI provider
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAI.as_str().to_string(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Configuration for the ElevenLabs provider
    #[must_use]
    pub fn elevenlabs(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::ElevenLabs.as_str().to_string(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Set the instance default voice
    #[must_use]
    pub fn with_default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }

    /// Set the instance default language
    #[must_use]
    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    /// Set the instance default output format
    #[must_use]
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    /// Resolve the provider name
    ///
    /// # Errors
    ///
    /// Returns the offending name if it is not a known provider.
    pub fn parsed_provider(&self) -> Result<Provider, String> {
        self.provider.parse()
    }

    /// API key, treating an empty string as absent
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Validate the configuration
    ///
    /// An unknown provider name is not a validation failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.edge_timeout_ms == 0 {
            return Err("Edge timeout must be greater than 0".to_string());
        }

        if self.edge_backoff_ms == 0 {
            return Err("Edge backoff unit must be greater than 0".to_string());
        }

        if self.http_timeout_ms == Some(0) {
            return Err("HTTP timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
