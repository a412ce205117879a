//! Types for speech requests
//!
//! `SpeechOptions` carries the per-call overrides; `SynthesisSettings` is the
//! fully resolved set handed to a provider.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_FORMAT, DEFAULT_LANG, DEFAULT_MAX_RETRIES, DEFAULT_PROSODY, DEFAULT_VOICE, TtsConfig,
};

/// Per-call overrides for a `speak` request
///
/// Every field is optional. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechOptions {
    /// Voice identifier
    #[serde(default)]
    pub voice: Option<String>,
    /// Language tag (e.g. "zh-CN")
    #[serde(default)]
    pub lang: Option<String>,
    /// Speaking rate (e.g. "+10%")
    #[serde(default)]
    pub rate: Option<String>,
    /// Pitch (e.g. "-5Hz")
    #[serde(default)]
    pub pitch: Option<String>,
    /// Volume (e.g. "+0%")
    #[serde(default)]
    pub volume: Option<String>,
    /// Edge output format
    #[serde(default)]
    pub format: Option<String>,
    /// Number of Edge attempts
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl SpeechOptions {
    /// Create empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the voice
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Override the language
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Override the speaking rate
    #[must_use]
    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    /// Override the pitch
    #[must_use]
    pub fn with_pitch(mut self, pitch: impl Into<String>) -> Self {
        self.pitch = Some(pitch.into());
        self
    }

    /// Override the volume
    #[must_use]
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self
    }

    /// Override the output format
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Override the number of Edge attempts
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Fully resolved settings for one synthesis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisSettings {
    /// Voice identifier
    pub voice: String,
    /// Language tag
    pub lang: String,
    /// Speaking rate
    pub rate: String,
    /// Pitch
    pub pitch: String,
    /// Volume
    pub volume: String,
    /// Edge output format
    pub format: String,
    /// Number of Edge attempts, at least 1
    pub max_retries: u32,
}

impl SynthesisSettings {
    /// Merge call options over instance defaults over built-in constants
    ///
    /// Each field falls back independently.
    #[must_use]
    pub fn resolve(config: &TtsConfig, options: &SpeechOptions) -> Self {
        Self {
            voice: pick(
                &[options.voice.as_deref(), Some(config.default_voice.as_str())],
                DEFAULT_VOICE,
            ),
            lang: pick(
                &[options.lang.as_deref(), Some(config.default_lang.as_str())],
                DEFAULT_LANG,
            ),
            rate: pick(&[options.rate.as_deref()], DEFAULT_PROSODY),
            pitch: pick(&[options.pitch.as_deref()], DEFAULT_PROSODY),
            volume: pick(&[options.volume.as_deref()], DEFAULT_PROSODY),
            format: pick(
                &[options.format.as_deref(), Some(config.default_format.as_str())],
                DEFAULT_FORMAT,
            ),
            max_retries: options
                .max_retries
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self::resolve(&TtsConfig::default(), &SpeechOptions::default())
    }
}

/// First non-empty candidate, else the fallback
fn pick(candidates: &[Option<&str>], fallback: &str) -> String {
    candidates
        .iter()
        .flatten()
        .find(|value| !value.is_empty())
        .copied()
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod speech_options {
        use super::*;

        #[test]
        fn builder_sets_fields() {
            let options = SpeechOptions::new()
                .with_voice("en-US-GuyNeural")
                .with_lang("en-US")
                .with_rate("+10%")
                .with_pitch("-2Hz")
                .with_volume("+5%")
                .with_format("riff-24khz-16bit-mono-pcm")
                .with_max_retries(5);

            assert_eq!(options.voice.as_deref(), Some("en-US-GuyNeural"));
            assert_eq!(options.lang.as_deref(), Some("en-US"));
            assert_eq!(options.rate.as_deref(), Some("+10%"));
            assert_eq!(options.pitch.as_deref(), Some("-2Hz"));
            assert_eq!(options.volume.as_deref(), Some("+5%"));
            assert_eq!(options.format.as_deref(), Some("riff-24khz-16bit-mono-pcm"));
            assert_eq!(options.max_retries, Some(5));
        }

        #[test]
        fn deserializes_partial_json() {
            let options: SpeechOptions =
                serde_json::from_str(r#"{"voice":"ja-JP-NanamiNeural"}"#).unwrap();
            assert_eq!(options.voice.as_deref(), Some("ja-JP-NanamiNeural"));
            assert!(options.lang.is_none());
            assert!(options.max_retries.is_none());
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn constants_apply_when_nothing_is_set() {
            let settings = SynthesisSettings::default();

            assert_eq!(settings.voice, "zh-CN-XiaoyiNeural");
            assert_eq!(settings.lang, "zh-CN");
            assert_eq!(settings.rate, "default");
            assert_eq!(settings.pitch, "default");
            assert_eq!(settings.volume, "default");
            assert_eq!(settings.format, "audio-24khz-48kbitrate-mono-mp3");
            assert_eq!(settings.max_retries, 3);
        }

        #[test]
        fn instance_defaults_override_constants() {
            let config = TtsConfig::default()
                .with_default_voice("en-GB-SoniaNeural")
                .with_default_lang("en-GB")
                .with_default_format("webm-24khz-16bit-mono-opus");

            let settings = SynthesisSettings::resolve(&config, &SpeechOptions::default());

            assert_eq!(settings.voice, "en-GB-SoniaNeural");
            assert_eq!(settings.lang, "en-GB");
            assert_eq!(settings.format, "webm-24khz-16bit-mono-opus");
        }

        #[test]
        fn options_override_instance_defaults() {
            let config = TtsConfig::default().with_default_voice("en-GB-SoniaNeural");
            let options = SpeechOptions::new()
                .with_voice("ko-KR-SunHiNeural")
                .with_rate("+20%");

            let settings = SynthesisSettings::resolve(&config, &options);

            assert_eq!(settings.voice, "ko-KR-SunHiNeural");
            assert_eq!(settings.rate, "+20%");
            // Untouched fields still come from the lower tiers
            assert_eq!(settings.lang, "zh-CN");
            assert_eq!(settings.pitch, "default");
        }

        #[test]
        fn empty_strings_fall_through() {
            let config = TtsConfig::default().with_default_voice("");
            let options = SpeechOptions::new().with_voice("").with_volume("");

            let settings = SynthesisSettings::resolve(&config, &options);

            assert_eq!(settings.voice, DEFAULT_VOICE);
            assert_eq!(settings.volume, DEFAULT_PROSODY);
        }

        #[test]
        fn zero_retries_falls_back_to_default() {
            let options = SpeechOptions::new().with_max_retries(0);
            let settings = SynthesisSettings::resolve(&TtsConfig::default(), &options);
            assert_eq!(settings.max_retries, DEFAULT_MAX_RETRIES);
        }

        #[test]
        fn single_retry_is_kept() {
            let options = SpeechOptions::new().with_max_retries(1);
            let settings = SynthesisSettings::resolve(&TtsConfig::default(), &options);
            assert_eq!(settings.max_retries, 1);
        }
    }
}
