//! OpenAI audio endpoints: `/audio/speech` and `/audio/transcriptions`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use vitae_core::speech::{SpeechSynthesizer, SpeechTranscriber};
use vitae_core::ProviderError;

use crate::http::{check_status, transport_error};

/// The built-in OpenAI voices.
pub const OPENAI_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// OpenAI text-to-speech and speech-to-text.
pub struct OpenAiSpeech {
    base_url: String,
    api_key: String,
    tts_model: String,
    transcription_model: String,
    client: reqwest::Client,
}

impl OpenAiSpeech {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            tts_model: "tts-1".into(),
            transcription_model: "whisper-1".into(),
            client,
        }
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    fn speech_body(&self, text: &str, voice: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.tts_model,
            "voice": voice,
            "input": text,
            "response_format": "mp3",
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/audio/speech", self.base_url);
        debug!(voice, chars = text.len(), "Requesting speech synthesis");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.speech_body(text, voice))
            .send()
            .await
            .map_err(transport_error)?;

        let bytes = check_status("openai", response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)?;

        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse("speech synthesis returned no audio".into()));
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl SpeechTranscriber for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(bytes = audio.len(), file_name, "Requesting transcription");

        let file = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let transcript: TranscriptionResponse = check_status("openai", response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        let text = transcript.text.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse("transcription was empty".into()));
        }
        Ok(text)
    }
}
