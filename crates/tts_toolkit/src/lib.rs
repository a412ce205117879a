//! TTS Toolkit - one text-to-speech call over several backends
//!
//! Converts text to an audio file through one of:
//! - Edge (free Microsoft read-aloud service, retried with linear backoff)
//! - OpenAI TTS API
//! - ElevenLabs TTS API
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the `TextToSpeech` trait (port)
//! - `providers` module contains the concrete adapters
//! - `dispatcher` picks the adapter once and merges per-call options
//! - `catalog` holds the static voice and language tables
//!
//! # Example
//!
//! ```ignore
//! use tts_toolkit::{SpeechDispatcher, SpeechOptions, TtsConfig};
//!
//! let tts = SpeechDispatcher::new(TtsConfig::edge())?;
//! tts.speak_default("你好，世界！", "/tmp/basic-example.mp3").await?;
//!
//! let options = SpeechOptions::new().with_voice("en-US-GuyNeural").with_lang("en-US");
//! tts.speak("Hello, World!", "/tmp/hello.mp3", &options).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod providers;
pub mod retry;
pub mod types;

pub use catalog::{LanguageEntry, LanguageFamily, VoiceCatalog, VoiceEntry, VoiceGender};
pub use config::{Provider, TtsConfig};
pub use dispatcher::SpeechDispatcher;
pub use error::SpeechError;
pub use ports::TextToSpeech;
pub use providers::{EdgeTtsProvider, ElevenLabsTtsProvider, OpenAITtsProvider};
pub use retry::RetryPolicy;
pub use types::{SpeechOptions, SynthesisSettings};
