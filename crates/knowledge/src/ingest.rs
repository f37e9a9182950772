//! Download, cache and decode the knowledge sources.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use vitae_core::KnowledgeContext;

use crate::drive::direct_download_url;
use crate::error::IngestError;
use crate::pdf::extract_pdf_text;

/// Scratch file name of the downloaded profile PDF.
pub const PROFILE_FILE: &str = "linkedin.pdf";
/// Scratch file name of the downloaded summary.
pub const SUMMARY_FILE: &str = "summary.txt";

/// Where to fetch each blob from and where to cache it.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeSources {
    pub profile_pdf_url: Option<String>,
    pub summary_url: Option<String>,
    pub scratch_dir: PathBuf,
}

/// Outcome for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded { chars: usize },
    /// No URL configured.
    Skipped,
    Failed(String),
}

/// Partial-context result of a startup ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub context: KnowledgeContext,
    pub profile: SourceStatus,
    pub summary: SourceStatus,
}

pub struct Ingestor {
    sources: KnowledgeSources,
    client: reqwest::Client,
}

impl Ingestor {
    pub fn new(sources: KnowledgeSources, client: reqwest::Client) -> Self {
        Self { sources, client }
    }

    /// Run both loads. Never fails; failures become empty blobs.
    pub async fn ingest(&self) -> IngestReport {
        let (profile_text, profile) = settle(
            "profile",
            self.sources.profile_pdf_url.as_deref(),
            |url| self.load_profile(url),
        )
        .await;
        let (summary_text, summary) = settle(
            "summary",
            self.sources.summary_url.as_deref(),
            |url| self.load_summary(url),
        )
        .await;

        IngestReport {
            context: KnowledgeContext::new(summary_text, profile_text),
            profile,
            summary,
        }
    }

    async fn load_profile(&self, url: &str) -> Result<String, IngestError> {
        let bytes = self.download(url, PROFILE_FILE).await?;
        tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| IngestError::Pdf(e.to_string()))?
    }

    async fn load_summary(&self, url: &str) -> Result<String, IngestError> {
        let bytes = self.download(url, SUMMARY_FILE).await?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Fetch `url` and cache the body under `file_name` in the scratch dir.
    async fn download(&self, url: &str, file_name: &str) -> Result<Vec<u8>, IngestError> {
        let url = direct_download_url(url)?;
        info!(url = %url, file = file_name, "Downloading knowledge source");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Download(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::Download(e.to_string()))?
            .to_vec();

        write_scratch(&self.sources.scratch_dir, file_name, &bytes).await?;
        Ok(bytes)
    }
}

async fn write_scratch(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<(), IngestError> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(file_name), bytes).await?;
    Ok(())
}

async fn settle<'a, F, Fut>(source: &str, url: Option<&'a str>, load: F) -> (String, SourceStatus)
where
    F: FnOnce(&'a str) -> Fut,
    Fut: std::future::Future<Output = Result<String, IngestError>>,
{
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        info!(source, "No URL configured, skipping");
        return (String::new(), SourceStatus::Skipped);
    };

    match load(url).await {
        Ok(text) => {
            let chars = text.chars().count();
            info!(source, chars, "Knowledge source loaded");
            (text, SourceStatus::Loaded { chars })
        }
        Err(e) => {
            warn!(source, error = %e, "Knowledge source failed, continuing without it");
            (String::new(), SourceStatus::Failed(e.to_string()))
        }
    }
}
