//! Speech traits: synthesis (text → audio) and transcription (audio → text).

use async_trait::async_trait;

use crate::error::ProviderError;

/// A text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Provider name, used for logging and artifact naming (e.g., "openai").
    fn name(&self) -> &str;

    /// Render `text` with the provider-specific `voice`; returns encoded audio (MP3).
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;
}

/// A speech-to-text backend.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe an uploaded recording. `file_name` carries the container hint.
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, ProviderError>;
}
