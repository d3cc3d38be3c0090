//! Speech synthesis through Google Cloud Text-to-Speech.

mod client;
mod sentences;
pub mod voices;

pub use client::{GoogleTtsClient, TtsAuth, Voice};
pub use sentences::split_sentences;

use sekai_core::Language;

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Text-to-Speech API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Audio payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Nothing to synthesize")]
    EmptyText,
}

/// Text in, encoded audio (MP3 by default) out.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// One request with a randomly chosen voice.
    async fn speak(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError>;

    /// Like [`speak`](Self::speak), but text over the single-request limit is
    /// synthesized sentence by sentence with one voice and concatenated.
    async fn speak_long(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError>;
}
