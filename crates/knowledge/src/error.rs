use thiserror::Error;

/// Reasons a single knowledge source could not be loaded.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Download returned HTTP {status}")]
    Status { status: u16 },

    #[error("Downloaded file is not a PDF (header {header:?})")]
    NotPdf { header: String },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Summary is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for IngestError {
    fn from(e: lopdf::Error) -> Self {
        IngestError::Pdf(e.to_string())
    }
}
