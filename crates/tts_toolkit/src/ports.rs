//! Port definitions for speech synthesis
//!
//! Defines the trait every provider adapter implements.

use std::path::Path;

use async_trait::async_trait;

use crate::config::Provider;
use crate::error::SpeechError;
use crate::types::SynthesisSettings;

/// Port for Text-to-Speech (TTS) implementations
///
/// Implementations turn text into an audio file at the given path,
/// overwriting whatever was there. The parent directory must exist.
///
/// # Example
///
/// ```ignore
/// use tts_toolkit::{SynthesisSettings, TextToSpeech};
///
/// async fn greet(tts: &impl TextToSpeech) -> Result<(), SpeechError> {
///     tts.synthesize_to_file("Hello", Path::new("/tmp/hello.mp3"), &SynthesisSettings::default())
///         .await
/// }
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` and write the audio to `output`
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `output` - Destination file, overwritten on success
    /// * `settings` - Resolved voice, language, prosody and format
    ///
    /// # Errors
    ///
    /// Returns the provider's synthesis error if the service or the write fails.
    async fn synthesize_to_file(
        &self,
        text: &str,
        output: &Path,
        settings: &SynthesisSettings,
    ) -> Result<(), SpeechError>;

    /// Which backend this adapter talks to
    fn provider(&self) -> Provider;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records calls and writes a fixed payload
    struct MockTextToSpeech {
        payload: Vec<u8>,
        calls: Mutex<Vec<(String, SynthesisSettings)>>,
    }

    #[async_trait]
    impl TextToSpeech for MockTextToSpeech {
        async fn synthesize_to_file(
            &self,
            text: &str,
            output: &Path,
            settings: &SynthesisSettings,
        ) -> Result<(), SpeechError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), settings.clone()));
            tokio::fs::write(output, &self.payload)
                .await
                .map_err(|e| SpeechError::InvalidInput(e.to_string()))
        }

        fn provider(&self) -> Provider {
            Provider::Edge
        }
    }

    #[tokio::test]
    async fn mock_writes_file_through_trait_object() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp3");
        let mock = MockTextToSpeech {
            payload: vec![0xFF, 0xFB, 0x90, 0x00],
            calls: Mutex::new(Vec::new()),
        };
        let tts: &dyn TextToSpeech = &mock;

        tts.synthesize_to_file("你好", &output, &SynthesisSettings::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), [0xFF, 0xFB, 0x90, 0x00]);
        let calls = mock.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "你好");
        assert_eq!(calls[0].1.voice, "zh-CN-XiaoyiNeural");
        assert_eq!(tts.provider(), Provider::Edge);
    }
}
