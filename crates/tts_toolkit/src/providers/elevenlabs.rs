//! ElevenLabs Speech Provider
//!
//! Implements `TextToSpeech` with the per-voice `text-to-speech/{voice_id}`
//! endpoint. The voice id is used as a path segment as-is.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{Provider, TtsConfig};
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::SynthesisSettings;

/// Model used for every request
pub const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

const XI_API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs text-to-speech adapter
#[derive(Debug, Clone)]
pub struct ElevenLabsTtsProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl ElevenLabsTtsProvider {
    /// Create a new ElevenLabs provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: &TtsConfig) -> Result<Self, SpeechError> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(|e| {
            SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_key: config.api_key().map(str::to_string),
            base_url: config.elevenlabs_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn tts_url(&self, voice_id: &str) -> String {
        format!("{}/text-to-speech/{voice_id}", self.base_url)
    }
}

/// ElevenLabs request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// ElevenLabs error body: `detail` is either an object or a bare string
#[derive(Debug, Deserialize)]
struct ApiError {
    detail: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Structured { message: String },
    Plain(String),
}

impl ApiErrorDetail {
    fn into_message(self) -> String {
        match self {
            Self::Structured { message } | Self::Plain(message) => message,
        }
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTtsProvider {
    #[instrument(skip(self, text, settings), fields(text_len = text.len(), voice = %settings.voice))]
    async fn synthesize_to_file(
        &self,
        text: &str,
        output: &Path,
        settings: &SynthesisSettings,
    ) -> Result<(), SpeechError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SpeechError::MissingCredential {
                provider: Provider::ElevenLabs.display_name(),
            })?;

        debug!("Synthesizing speech with ElevenLabs");

        let request = TtsRequest {
            text,
            model_id: ELEVENLABS_MODEL,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .client
            .post(self.tts_url(&settings.voice))
            .header(XI_API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::ElevenLabsSynthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            let detail = serde_json::from_str::<ApiError>(&error_body)
                .map_or(error_body, |api_error| api_error.detail.into_message());

            return Err(SpeechError::ElevenLabsSynthesis(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let audio_bytes: Bytes = response.bytes().await.map_err(|e| {
            SpeechError::ElevenLabsSynthesis(format!("Failed to read audio: {e}"))
        })?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::ElevenLabsSynthesis(
                "Service returned an empty audio body".to_string(),
            ));
        }

        tokio::fs::write(output, &audio_bytes).await.map_err(|e| {
            SpeechError::ElevenLabsSynthesis(format!("Failed to write {}: {e}", output.display()))
        })?;

        info!(audio_size = audio_bytes.len(), output = %output.display(), "TTS succeeded");
        Ok(())
    }

    fn provider(&self) -> Provider {
        Provider::ElevenLabs
    }
}
