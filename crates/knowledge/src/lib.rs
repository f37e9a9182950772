//! # Vitae Knowledge
//!
//! Startup ingestion of the two knowledge blobs: the profile summary (plain
//! text) and the profile document (a PDF export). Ingestion is best-effort:
//! [`Ingestor::ingest`] never fails, it returns whatever it could load plus a
//! per-source status, and the process carries on with a partial or empty
//! [`KnowledgeContext`](vitae_core::KnowledgeContext).

pub mod drive;
pub mod error;
pub mod ingest;
pub mod pdf;

pub use drive::direct_download_url;
pub use error::IngestError;
pub use ingest::{IngestReport, Ingestor, KnowledgeSources, SourceStatus};
pub use pdf::extract_pdf_text;
