//! Speech dispatcher
//!
//! The single entry point callers use: resolves per-call options against the
//! instance configuration and hands the request to the adapter selected at
//! construction time.
//!
//! ```text
//! speak(text, path, options)
//!     │
//!     ▼
//! ┌──────────────────────────────┐
//! │  SpeechDispatcher            │
//! │  options > defaults > consts │
//! └──────────────────────────────┘
//!     │
//!     ├── edge       → EdgeTtsProvider (retry + backoff)
//!     ├── openai     → OpenAITtsProvider
//!     └── elevenlabs → ElevenLabsTtsProvider
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::catalog::{self, LanguageEntry, VoiceCatalog};
use crate::config::{Provider, TtsConfig};
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::providers::{EdgeTtsProvider, ElevenLabsTtsProvider, OpenAITtsProvider};
use crate::types::{SpeechOptions, SynthesisSettings};

/// Uniform text-to-speech facade over the supported providers
///
/// Cheap to clone and safe to share between tasks: the configuration is
/// immutable after construction.
#[derive(Clone)]
pub struct SpeechDispatcher {
    config: Arc<TtsConfig>,
    /// `None` when the configured provider name is unknown
    backend: Option<Arc<dyn TextToSpeech>>,
}

impl std::fmt::Debug for SpeechDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechDispatcher")
            .field("provider", &self.config.provider)
            .field("has_api_key", &self.config.api_key().is_some())
            .field("backend", &self.backend.as_ref().map(|b| b.provider()))
            .finish()
    }
}

impl SpeechDispatcher {
    /// Create a dispatcher for the configured provider
    ///
    /// An unknown provider name is accepted here; every `speak` call then
    /// fails with `SpeechError::UnknownProvider`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid or
    /// an HTTP client cannot be built.
    pub fn new(config: TtsConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let backend: Option<Arc<dyn TextToSpeech>> = match config.parsed_provider() {
            Ok(Provider::Edge) => Some(Arc::new(EdgeTtsProvider::new(&config))),
            Ok(Provider::OpenAI) => Some(Arc::new(OpenAITtsProvider::new(&config)?)),
            Ok(Provider::ElevenLabs) => Some(Arc::new(ElevenLabsTtsProvider::new(&config)?)),
            Err(name) => {
                warn!(provider = %name, "Unknown TTS provider configured, speak calls will fail");
                None
            },
        };

        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }

    /// Create a dispatcher around a custom adapter
    ///
    /// The configuration still supplies the instance defaults.
    #[must_use]
    pub fn with_backend(config: TtsConfig, backend: Arc<dyn TextToSpeech>) -> Self {
        Self {
            config: Arc::new(config),
            backend: Some(backend),
        }
    }

    /// Convert `text` to an audio file at `output_path`
    ///
    /// The parent directory of `output_path` must already exist.
    ///
    /// # Errors
    ///
    /// - `UnknownProvider` if the configured provider is not known
    /// - `InvalidInput` if `text` is blank
    /// - `MissingCredential` if a paid provider has no API key
    /// - the provider's synthesis error otherwise
    #[instrument(skip(self, text, output_path, options), fields(provider = %self.config.provider, text_len = text.len()))]
    pub async fn speak(
        &self,
        text: &str,
        output_path: impl AsRef<Path>,
        options: &SpeechOptions,
    ) -> Result<(), SpeechError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| SpeechError::UnknownProvider(self.config.provider.clone()))?;

        if text.trim().is_empty() {
            return Err(SpeechError::InvalidInput(
                "Text cannot be empty".to_string(),
            ));
        }

        let settings = self.settings_for(options);
        debug!(?settings, "Resolved synthesis settings");

        backend
            .synthesize_to_file(text, output_path.as_ref(), &settings)
            .await
    }

    /// `speak` with no per-call overrides
    ///
    /// # Errors
    ///
    /// See [`SpeechDispatcher::speak`].
    pub async fn speak_default(
        &self,
        text: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<(), SpeechError> {
        self.speak(text, output_path, &SpeechOptions::default())
            .await
    }

    /// Settings a `speak` call with these options would use
    #[must_use]
    pub fn settings_for(&self, options: &SpeechOptions) -> SynthesisSettings {
        SynthesisSettings::resolve(&self.config, options)
    }

    /// Configured provider name, as given
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.config.provider
    }

    /// Resolved provider, `None` if the name is unknown
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        self.backend.as_ref().map(|backend| backend.provider())
    }

    /// The immutable configuration
    #[must_use]
    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Catalog voices grouped by language family
    #[must_use]
    pub fn voices(&self) -> VoiceCatalog {
        catalog::voice_catalog()
    }

    /// Supported languages with voice counts
    #[must_use]
    pub fn list_languages(&self) -> Vec<LanguageEntry> {
        catalog::list_languages()
    }
}
