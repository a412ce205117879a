//! Speech provider implementations
//!
//! Contains the concrete `TextToSpeech` adapters.

pub mod edge;
pub mod elevenlabs;
pub mod openai;

pub use edge::EdgeTtsProvider;
pub use elevenlabs::ElevenLabsTtsProvider;
pub use openai::OpenAITtsProvider;
