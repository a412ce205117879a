//! Edge Speech Provider
//!
//! Implements `TextToSpeech` against the free Microsoft Edge read-aloud
//! service. Each attempt opens a fresh WebSocket session:
//!
//! ```text
//! client                                   service
//!   │── text: Path:speech.config ───────────▶│
//!   │── text: Path:ssml ────────────────────▶│
//!   │◀─ binary: Path:audio (repeated) ───────│
//!   │◀─ text: Path:turn.end ─────────────────│
//! ```
//!
//! Attempts are bounded by a per-attempt timeout and retried with linear
//! backoff (see [`crate::retry`]).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request};
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{Provider, TtsConfig};
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::retry::{RetryPolicy, with_retry};
use crate::types::SynthesisSettings;

/// Public token the Edge browser uses for read-aloud
const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";
/// Browser version the `Sec-MS-GEC` token is issued for
const SEC_MS_GEC_VERSION: &str = "1-130.0.2849.68";
const ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0";

/// Seconds between 1601-01-01 (Windows epoch) and 1970-01-01
const WINDOWS_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
/// `Sec-MS-GEC` tokens are valid for five-minute windows
const SEC_MS_GEC_WINDOW_SECS: i64 = 300;

/// Failure of a single Edge session
#[derive(Debug, Error)]
enum EdgeSessionError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("No audio received")]
    NoAudio,

    #[error("Timed out after {0}ms")]
    Timeout(u128),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Edge read-aloud adapter
#[derive(Debug, Clone)]
pub struct EdgeTtsProvider {
    endpoint: String,
    timeout: Duration,
    backoff_unit: Duration,
}

impl EdgeTtsProvider {
    /// Create a new Edge provider
    #[must_use]
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            endpoint: config.edge_endpoint.clone(),
            timeout: Duration::from_millis(config.edge_timeout_ms),
            backoff_unit: Duration::from_millis(config.edge_backoff_ms),
        }
    }

    /// Build the WebSocket handshake request for a new session
    fn session_request(&self, now: DateTime<Utc>) -> Result<Request<()>, EdgeSessionError> {
        let url = format!(
            "{}?TrustedClientToken={TRUSTED_CLIENT_TOKEN}&ConnectionId={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={SEC_MS_GEC_VERSION}",
            self.endpoint,
            Uuid::new_v4().simple(),
            sec_ms_gec(now),
        );

        let mut request = url.into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Origin", HeaderValue::from_static(ORIGIN));
        headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));
        headers.insert("Pragma", HeaderValue::from_static("no-cache"));
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        Ok(request)
    }

    /// Run one session and collect the audio payload
    async fn fetch_audio(
        &self,
        text: &str,
        settings: &SynthesisSettings,
    ) -> Result<Vec<u8>, EdgeSessionError> {
        let now = Utc::now();
        let request = self.session_request(now)?;
        let (ws_stream, _) = connect_async(request).await?;
        let (mut writer, mut reader) = ws_stream.split();

        let timestamp = js_timestamp(now);
        let request_id = Uuid::new_v4().simple().to_string();

        writer
            .send(Message::text(speech_config_message(&timestamp, &settings.format)))
            .await?;
        writer
            .send(Message::text(ssml_message(
                &request_id,
                &timestamp,
                &build_ssml(text, settings),
            )))
            .await?;

        let mut audio = Vec::new();
        let mut finished = false;

        while let Some(message) = reader.next().await {
            match message? {
                Message::Binary(frame) => {
                    if let Some(chunk) = audio_payload(&frame)? {
                        audio.extend_from_slice(chunk);
                    }
                },
                Message::Text(frame) => {
                    if header_path(frame.as_str()) == Some("turn.end") {
                        finished = true;
                        break;
                    }
                },
                Message::Close(_) => break,
                _ => {},
            }
        }

        if let Err(e) = writer.close().await {
            debug!(error = %e, "Closing Edge session failed");
        }

        if !finished {
            return Err(EdgeSessionError::Protocol(
                "connection closed before turn.end".to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(EdgeSessionError::NoAudio);
        }

        Ok(audio)
    }

    /// One bounded attempt: fetch audio, then overwrite the output file
    async fn attempt(
        &self,
        text: &str,
        output: &Path,
        settings: &SynthesisSettings,
        attempt: u32,
    ) -> Result<usize, EdgeSessionError> {
        debug!(attempt, voice = %settings.voice, "Starting Edge session");

        let audio = tokio::time::timeout(self.timeout, self.fetch_audio(text, settings))
            .await
            .map_err(|_| EdgeSessionError::Timeout(self.timeout.as_millis()))??;

        tokio::fs::write(output, &audio)
            .await
            .map_err(|source| EdgeSessionError::Write {
                path: output.display().to_string(),
                source,
            })?;

        Ok(audio.len())
    }
}

#[async_trait]
impl TextToSpeech for EdgeTtsProvider {
    #[instrument(skip(self, text, settings), fields(text_len = text.len(), voice = %settings.voice, max_retries = settings.max_retries))]
    async fn synthesize_to_file(
        &self,
        text: &str,
        output: &Path,
        settings: &SynthesisSettings,
    ) -> Result<(), SpeechError> {
        let policy = RetryPolicy::new(settings.max_retries, self.backoff_unit);

        let outcome = with_retry(&policy, |attempt| {
            self.attempt(text, output, settings, attempt)
        })
        .await;

        match outcome.result {
            Ok(audio_size) => {
                info!(
                    audio_size,
                    attempts = outcome.attempts,
                    output = %output.display(),
                    "TTS succeeded"
                );
                Ok(())
            },
            Err(err) => Err(SpeechError::EdgeSynthesis {
                attempts: policy.max_attempts(),
                message: err.to_string(),
            }),
        }
    }

    fn provider(&self) -> Provider {
        Provider::Edge
    }
}

/// `Sec-MS-GEC` token: SHA-256 of the Windows file time (rounded down to
/// five minutes) followed by the client token, as uppercase hex
fn sec_ms_gec(now: DateTime<Utc>) -> String {
    let secs = now.timestamp() + WINDOWS_EPOCH_OFFSET_SECS;
    let rounded = secs - secs.rem_euclid(SEC_MS_GEC_WINDOW_SECS);
    // 100-nanosecond intervals
    let ticks = i128::from(rounded) * 10_000_000;

    let digest = Sha256::digest(format!("{ticks}{TRUSTED_CLIENT_TOKEN}").as_bytes());
    digest.iter().map(|byte| format!("{byte:02X}")).collect()
}

/// Timestamp in the JavaScript `Date.toString()` shape the service expects
fn js_timestamp(now: DateTime<Utc>) -> String {
    now.format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

fn speech_config_message(timestamp: &str, format: &str) -> String {
    let body = serde_json::json!({
        "context": {
            "synthesis": {
                "audio": {
                    "metadataoptions": {
                        "sentenceBoundaryEnabled": "false",
                        "wordBoundaryEnabled": "false"
                    },
                    "outputFormat": format
                }
            }
        }
    });

    format!(
        "X-Timestamp:{timestamp}\r\nContent-Type:application/json; charset=utf-8\r\nPath:speech.config\r\n\r\n{body}"
    )
}

fn ssml_message(request_id: &str, timestamp: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{request_id}\r\nContent-Type:application/ssml+xml\r\nX-Timestamp:{timestamp}Z\r\nPath:ssml\r\n\r\n{ssml}"
    )
}

fn build_ssml(text: &str, settings: &SynthesisSettings) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' \
         xmlns:mstts='https://www.w3.org/2001/mstts' xml:lang='{lang}'>\
         <voice name='{voice}'>\
         <prosody rate='{rate}' pitch='{pitch}' volume='{volume}'>{text}</prosody>\
         </voice></speak>",
        lang = escape_xml(&settings.lang),
        voice = escape_xml(&settings.voice),
        rate = escape_xml(&settings.rate),
        pitch = escape_xml(&settings.pitch),
        volume = escape_xml(&settings.volume),
        text = escape_xml(text),
    )
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Value of the `Path:` header in a text frame
fn header_path(frame: &str) -> Option<&str> {
    let headers = frame.split("\r\n\r\n").next().unwrap_or(frame);
    headers
        .lines()
        .find_map(|line| line.strip_prefix("Path:"))
        .map(str::trim)
}

/// Audio payload of a binary frame, `None` for non-audio frames
///
/// Layout: 2-byte big-endian header length, header text, payload.
fn audio_payload(frame: &[u8]) -> Result<Option<&[u8]>, EdgeSessionError> {
    let Some((len_bytes, rest)) = frame.split_first_chunk::<2>() else {
        return Err(EdgeSessionError::Protocol(
            "binary frame shorter than its length prefix".to_string(),
        ));
    };

    let header_len = usize::from(u16::from_be_bytes(*len_bytes));
    if rest.len() < header_len {
        return Err(EdgeSessionError::Protocol(format!(
            "binary frame header length {header_len} exceeds frame size {}",
            rest.len()
        )));
    }

    let (header, payload) = rest.split_at(header_len);
    let header = String::from_utf8_lossy(header);

    if header_path(&header) == Some("audio") {
        Ok(Some(payload))
    } else {
        Ok(None)
    }
}
