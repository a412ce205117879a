//! OpenAI Speech Provider
//!
//! Implements `TextToSpeech` using the OpenAI `audio/speech` endpoint.
//! Single shot: no retry. Output is always MP3 regardless of the
//! requested Edge format.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{Provider, TtsConfig};
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::SynthesisSettings;

/// Model used for every request
pub const OPENAI_TTS_MODEL: &str = "tts-1";

/// Voice sent when normalization leaves nothing
pub const OPENAI_FALLBACK_VOICE: &str = "alloy";

/// Voice names the speech endpoint accepts
const OPENAI_VOICES: &[&str] = &[
    "alloy", "ash", "ballad", "coral", "echo", "fable", "nova", "onyx", "sage", "shimmer", "verse",
];

/// OpenAI text-to-speech adapter
#[derive(Debug, Clone)]
pub struct OpenAITtsProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAITtsProvider {
    /// Create a new OpenAI provider
    ///
    /// A missing API key is not an error here; `synthesize_to_file`
    /// rejects the call instead.
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
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the TTS endpoint URL
    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }

    /// Map a catalog voice id onto an OpenAI voice name
    ///
    /// Strips the `en-US-` prefix and the `Neural` suffix, lowercases the
    /// rest and falls back to `alloy` when nothing is left.
    #[must_use]
    pub fn normalize_voice(voice: &str) -> String {
        let name = voice.strip_prefix("en-US-").unwrap_or(voice);
        let name = name.strip_suffix("Neural").unwrap_or(name);
        let name = name.to_lowercase();

        if name.is_empty() {
            OPENAI_FALLBACK_VOICE.to_string()
        } else {
            name
        }
    }

    /// Whether the endpoint is known to accept this voice name
    #[must_use]
    pub fn is_known_voice(voice: &str) -> bool {
        OPENAI_VOICES.contains(&voice)
    }
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl TextToSpeech for OpenAITtsProvider {
    #[instrument(skip(self, text, settings), fields(text_len = text.len(), output = %output.display()))]
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
                provider: Provider::OpenAI.display_name(),
            })?;

        let voice = Self::normalize_voice(&settings.voice);
        if !Self::is_known_voice(&voice) {
            warn!(
                configured = %settings.voice,
                normalized = %voice,
                "Voice does not map onto a known OpenAI voice, sending it unchanged"
            );
        }

        debug!(voice = %voice, "Synthesizing speech with OpenAI TTS");

        let request = TtsRequest {
            model: OPENAI_TTS_MODEL,
            input: text,
            voice: &voice,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::OpenAISynthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return Err(SpeechError::OpenAISynthesis(format!(
                    "HTTP {status}: {}",
                    api_error.error.message
                )));
            }

            return Err(SpeechError::OpenAISynthesis(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::OpenAISynthesis(format!("Failed to read audio: {e}")))?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::OpenAISynthesis(
                "Service returned an empty audio body".to_string(),
            ));
        }

        tokio::fs::write(output, &audio_bytes).await.map_err(|e| {
            SpeechError::OpenAISynthesis(format!("Failed to write {}: {e}", output.display()))
        })?;

        info!(audio_size = audio_bytes.len(), output = %output.display(), "TTS succeeded");
        Ok(())
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_provider(mock_server: &MockServer, api_key: Option<&str>) -> OpenAITtsProvider {
        let config = TtsConfig {
            api_key: api_key.map(str::to_string),
            openai_base_url: mock_server.uri(),
            ..TtsConfig::openai("")
        };
        OpenAITtsProvider::new(&config).unwrap()
    }

    fn settings_with_voice(voice: &str) -> SynthesisSettings {
        SynthesisSettings {
            voice: voice.to_string(),
            ..Default::default()
        }
    }

    mod voice_normalization {
        use super::*;

        #[test]
        fn strips_en_us_prefix_and_lowercases() {
            assert_eq!(OpenAITtsProvider::normalize_voice("en-US-GuyNeural"), "guy");
            assert_eq!(
                OpenAITtsProvider::normalize_voice("en-US-MichelleNeural"),
                "michelle"
            );
        }

        #[test]
        fn passes_plain_openai_names_through() {
            assert_eq!(OpenAITtsProvider::normalize_voice("Nova"), "nova");
            assert_eq!(OpenAITtsProvider::normalize_voice("shimmer"), "shimmer");
        }

        #[test]
        fn empty_result_falls_back_to_alloy() {
            assert_eq!(OpenAITtsProvider::normalize_voice(""), "alloy");
            assert_eq!(OpenAITtsProvider::normalize_voice("en-US-"), "alloy");
            assert_eq!(OpenAITtsProvider::normalize_voice("en-US-Neural"), "alloy");
        }

        #[test]
        fn non_english_ids_are_lowercased_but_not_recognized() {
            let voice = OpenAITtsProvider::normalize_voice("zh-CN-XiaoyiNeural");
            assert_eq!(voice, "zh-cn-xiaoyi");
            assert!(!OpenAITtsProvider::is_known_voice(&voice));
        }

        #[test]
        fn known_voices() {
            assert!(OpenAITtsProvider::is_known_voice("alloy"));
            assert!(OpenAITtsProvider::is_known_voice("onyx"));
            assert!(!OpenAITtsProvider::is_known_voice("guy"));
        }
    }

    mod synthesis {
        use super::*;

        #[tokio::test]
        async fn writes_response_body_verbatim() {
            let mock_server = MockServer::start().await;
            let audio_bytes = vec![0xFF, 0xFB, 0x90, 0x00, 0x11, 0x22, 0x33];

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .and(header("authorization", "Bearer sk-test"))
                .and(body_partial_json(serde_json::json!({
                    "model": "tts-1",
                    "input": "Hello",
                    "voice": "guy",
                    "response_format": "mp3"
                })))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_bytes.clone()))
                .expect(1)
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-test"));
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("x.mp3");

            provider
                .synthesize_to_file("Hello", &output, &settings_with_voice("en-US-GuyNeural"))
                .await
                .unwrap();

            assert_eq!(std::fs::read(&output).unwrap(), audio_bytes);
        }

        #[tokio::test]
        async fn overwrites_existing_file() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4]))
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-test"));
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("x.mp3");
            std::fs::write(&output, vec![1u8; 64]).unwrap();

            provider
                .synthesize_to_file("Hello", &output, &settings_with_voice("alloy"))
                .await
                .unwrap();

            assert_eq!(std::fs::read(&output).unwrap(), [7u8; 4]);
        }

        #[tokio::test]
        async fn missing_api_key_fails_before_network() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, None);
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("x.mp3");

            let result = provider
                .synthesize_to_file("Hello", &output, &SynthesisSettings::default())
                .await;

            assert!(matches!(
                result,
                Err(SpeechError::MissingCredential { provider: "OpenAI" })
            ));
            assert!(!output.exists());
        }

        #[tokio::test]
        async fn api_error_is_wrapped() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                    "error": {
                        "message": "Incorrect API key provided",
                        "type": "invalid_request_error",
                        "code": "invalid_api_key"
                    }
                })))
                .expect(1)
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-bad"));
            let dir = tempfile::tempdir().unwrap();

            let result = provider
                .synthesize_to_file(
                    "Hello",
                    &dir.path().join("x.mp3"),
                    &settings_with_voice("alloy"),
                )
                .await;

            match result {
                Err(SpeechError::OpenAISynthesis(message)) => {
                    assert!(message.contains("401"));
                    assert!(message.contains("Incorrect API key provided"));
                },
                other => panic!("unexpected result: {other:?}"),
            }
        }

        #[tokio::test]
        async fn plain_error_body_is_kept() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-test"));
            let dir = tempfile::tempdir().unwrap();

            let result = provider
                .synthesize_to_file(
                    "Hello",
                    &dir.path().join("x.mp3"),
                    &settings_with_voice("alloy"),
                )
                .await;

            assert!(
                matches!(result, Err(SpeechError::OpenAISynthesis(ref m)) if m.contains("bad gateway"))
            );
        }

        #[tokio::test]
        async fn empty_body_is_an_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .respond_with(ResponseTemplate::new(200))
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-test"));
            let dir = tempfile::tempdir().unwrap();

            let result = provider
                .synthesize_to_file(
                    "Hello",
                    &dir.path().join("x.mp3"),
                    &settings_with_voice("alloy"),
                )
                .await;

            assert!(matches!(result, Err(SpeechError::OpenAISynthesis(_))));
        }

        #[tokio::test]
        async fn missing_parent_directory_is_a_synthesis_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/audio/speech"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 8]))
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server, Some("sk-test"));
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("missing").join("x.mp3");

            let result = provider
                .synthesize_to_file("Hello", &output, &settings_with_voice("alloy"))
                .await;

            assert!(matches!(result, Err(SpeechError::OpenAISynthesis(ref m)) if m.contains("Failed to write")));
        }
    }

    #[test]
    fn reports_openai_provider() {
        let provider = OpenAITtsProvider::new(&TtsConfig::openai("sk-test")).unwrap();
        assert_eq!(provider.provider(), Provider::OpenAI);
    }
}
