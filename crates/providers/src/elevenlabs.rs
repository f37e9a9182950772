//! ElevenLabs synthesis: the backend behind the "custom" (cloned) voice.

use async_trait::async_trait;
use tracing::debug;
use vitae_core::speech::SpeechSynthesizer;
use vitae_core::ProviderError;

use crate::http::{check_status, transport_error};

pub struct ElevenLabsSynthesizer {
    base_url: String,
    api_key: String,
    model_id: String,
    client: reqwest::Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: impl Into<String>, model_id: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: "https://api.elevenlabs.io/v1".into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn speech_url(&self, voice_id: &str) -> String {
        format!("{}/text-to-speech/{voice_id}", self.base_url)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    /// `voice` is the ElevenLabs voice id of the cloned voice.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        if voice.trim().is_empty() {
            return Err(ProviderError::NotConfigured("no ElevenLabs voice id".into()));
        }
        debug!(voice, chars = text.len(), "Requesting ElevenLabs synthesis");

        let response = self
            .client
            .post(self.speech_url(voice))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&serde_json::json!({
                "text": text,
                "model_id": self.model_id,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let bytes = check_status("elevenlabs", response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)?;

        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse("ElevenLabs returned no audio".into()));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_url_embeds_voice_id() {
        let synth = ElevenLabsSynthesizer::new("k", "eleven_multilingual_v2", reqwest::Client::new())
            .with_base_url("http://localhost:9999/v1/");
        assert_eq!(synth.speech_url("abc123"), "http://localhost:9999/v1/text-to-speech/abc123");
    }

    #[tokio::test]
    async fn blank_voice_id_is_not_configured() {
        let synth = ElevenLabsSynthesizer::new("k", "m", reqwest::Client::new());
        let err = synth.synthesize("hello", " ").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
