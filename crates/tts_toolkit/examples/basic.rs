//! Basic Edge text-to-speech example
//!
//! Synthesizes a short Chinese greeting with the free Edge provider, then
//! prints part of the voice catalog and the supported languages.

#![allow(clippy::print_stdout)]

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_toolkit::{LanguageFamily, SpeechDispatcher, TtsConfig};

const OUTPUT_PATH: &str = "/tmp/basic-example.mp3";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic=info,tts_toolkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tts = SpeechDispatcher::new(TtsConfig::edge())?;

    tts.speak_default("你好，世界！", OUTPUT_PATH).await?;
    info!(output = OUTPUT_PATH, "Speech file written");

    let voices = tts.voices();
    for family in [LanguageFamily::Chinese, LanguageFamily::English] {
        println!("{family:?} voices:");
        for voice in voices.family(family) {
            println!("  {} ({})", voice.name, voice.id);
        }
    }

    println!("Languages:");
    for language in tts.list_languages() {
        println!(
            "  {} {} ({} voices)",
            language.code, language.name, language.voice_count
        );
    }

    Ok(())
}
