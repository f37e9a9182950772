//! Speech synthesis with a fixed fallback voice.
//!
//! The selected voice is tried first; if its provider is missing or fails,
//! the default OpenAI `alloy` voice is tried. Audio is written to the
//! scratch directory under a content address, so the same text in the same
//! provider voice always lands in the same artifact. Only the most recent
//! `max_artifacts` files are kept; older ones are removed after each write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use vitae_core::{ProviderError, SpeechSynthesizer};

use crate::selector::VoiceSelector;

/// The voice every failed synthesis falls back to.
pub const FALLBACK_VOICE: VoiceSelector = VoiceSelector::Alloy;

const ARTIFACT_PREFIX: &str = "speech-";
const ARTIFACT_EXTENSION: &str = "mp3";

/// Artifacts kept on disk unless configured otherwise.
pub const DEFAULT_MAX_ARTIFACTS: usize = 32;

/// A synthesized response on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    /// Hex SHA-256 of provider, voice and text.
    pub id: String,
    pub path: PathBuf,
    /// Which provider produced it (e.g. "openai").
    pub provider: String,
    /// The provider-specific voice used.
    pub voice: String,
}

/// One concrete synthesis attempt.
struct Route {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice: String,
}

/// The cloned-voice backend and its voice identifier.
struct CustomVoice {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice_id: String,
}

pub struct VoiceAdapter {
    openai: Arc<dyn SpeechSynthesizer>,
    custom: Option<CustomVoice>,
    scratch_dir: PathBuf,
    timeout: Duration,
    max_artifacts: usize,
}

impl VoiceAdapter {
    pub fn new(openai: Arc<dyn SpeechSynthesizer>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            openai,
            custom: None,
            scratch_dir: scratch_dir.into(),
            timeout: Duration::from_secs(60),
            max_artifacts: DEFAULT_MAX_ARTIFACTS,
        }
    }

    /// Serve `VoiceSelector::Custom` with `synthesizer` and `voice_id`.
    pub fn with_custom_voice(mut self, synthesizer: Arc<dyn SpeechSynthesizer>, voice_id: impl Into<String>) -> Self {
        self.custom = Some(CustomVoice {
            synthesizer,
            voice_id: voice_id.into(),
        });
        self
    }

    /// Per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep at most `max` artifacts in the scratch directory (at least one).
    pub fn with_max_artifacts(mut self, max: usize) -> Self {
        self.max_artifacts = max.max(1);
        self
    }

    pub fn custom_available(&self) -> bool {
        self.custom.is_some()
    }

    /// Synthesize `text` in `voice`, falling back to the default voice.
    ///
    /// Returns `None` only when the fallback fails too, or the text is blank.
    pub async fn synthesize(&self, text: &str, voice: VoiceSelector) -> Option<AudioArtifact> {
        if text.trim().is_empty() {
            debug!("Nothing to synthesize");
            return None;
        }

        let mut chain = Vec::with_capacity(2);
        match self.route(voice) {
            Ok(route) => chain.push(route),
            Err(e) => warn!(voice = %voice, error = %e, "Selected voice unavailable"),
        }
        if voice != FALLBACK_VOICE {
            chain.push(self.openai_route(FALLBACK_VOICE));
        }

        for (i, route) in chain.iter().enumerate() {
            let provider = route.synthesizer.name().to_string();
            info!(provider = %provider, voice = %route.voice, attempt = i + 1, total = chain.len(), "Synthesizing speech");

            match tokio::time::timeout(self.timeout, route.synthesizer.synthesize(text, &route.voice)).await {
                Ok(Ok(audio)) => return self.store(&provider, &route.voice, text, &audio).await,
                Ok(Err(e)) => {
                    warn!(provider = %provider, error = %e, "Speech synthesis failed");
                }
                Err(_) => {
                    warn!(provider = %provider, timeout_secs = self.timeout.as_secs(), "Speech synthesis timed out");
                }
            }
        }

        warn!("No audio produced for this response");
        None
    }

    /// Read back a stored artifact by id.
    pub async fn read_artifact(&self, id: &str) -> Option<Vec<u8>> {
        if !is_artifact_id(id) {
            return None;
        }
        tokio::fs::read(self.artifact_path(id)).await.ok()
    }

    pub fn artifact_path(&self, id: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{ARTIFACT_PREFIX}{id}.{ARTIFACT_EXTENSION}"))
    }

    fn route(&self, voice: VoiceSelector) -> Result<Route, ProviderError> {
        if !voice.is_custom() {
            return Ok(self.openai_route(voice));
        }
        match &self.custom {
            Some(custom) if !custom.voice_id.trim().is_empty() => Ok(Route {
                synthesizer: custom.synthesizer.clone(),
                voice: custom.voice_id.clone(),
            }),
            Some(_) => Err(ProviderError::NotConfigured("custom voice has no reference voice id".into())),
            None => Err(ProviderError::NotConfigured("custom voice provider not configured".into())),
        }
    }

    fn openai_route(&self, voice: VoiceSelector) -> Route {
        Route {
            synthesizer: self.openai.clone(),
            voice: voice.as_str().to_string(),
        }
    }

    async fn store(&self, provider: &str, voice: &str, text: &str, audio: &[u8]) -> Option<AudioArtifact> {
        let id = artifact_id(provider, voice, text);
        let path = self.artifact_path(&id);

        if let Err(e) = write_audio(&self.scratch_dir, &path, audio).await {
            warn!(path = %path.display(), error = %e, "Could not write audio artifact");
            return None;
        }

        debug!(id = %id, bytes = audio.len(), "Audio artifact stored");

        match self.prune(&path).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Old audio artifacts removed"),
            Err(e) => warn!(dir = %self.scratch_dir.display(), error = %e, "Could not prune audio artifacts"),
        }

        Some(AudioArtifact {
            id,
            path,
            provider: provider.to_string(),
            voice: voice.to_string(),
        })
    }

    /// Remove the oldest artifacts beyond `max_artifacts`, never `keep`.
    async fn prune(&self, keep: &Path) -> std::io::Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.scratch_dir).await?;
        let mut others = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_name() == keep.file_name() || !is_artifact_file(&path) {
                continue;
            }
            // A file removed by a concurrent prune is simply skipped.
            let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                continue;
            };
            others.push((modified, path));
        }

        let excess = others.len().saturating_sub(self.max_artifacts - 1);
        if excess == 0 {
            return Ok(0);
        }

        others.sort();
        let mut removed = 0;
        for (_, path) in others.into_iter().take(excess) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = %path.display(), error = %e, "Artifact already gone"),
            }
        }
        Ok(removed)
    }
}

async fn write_audio(dir: &Path, path: &Path, audio: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, audio).await
}

fn artifact_id(provider: &str, voice: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update([0u8]);
    hasher.update(voice.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_artifact_id(id: &str) -> bool {
    id.len() == 64 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_artifact_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(ARTIFACT_PREFIX))
        .and_then(|rest| rest.strip_suffix(ARTIFACT_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(is_artifact_id)
}
