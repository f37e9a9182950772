//! Profile PDF text extraction.

use lopdf::Document;
use tracing::debug;

use crate::error::IngestError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extract the text of every page, in page order, concatenated.
///
/// Pages with no extractable text are skipped. Bytes that do not start with
/// the `%PDF-` header are rejected before parsing.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, IngestError> {
    if !bytes.starts_with(PDF_MAGIC) {
        let header = String::from_utf8_lossy(&bytes[..bytes.len().min(8)]).into_owned();
        return Err(IngestError::NotPdf { header });
    }

    let document = Document::load_mem(bytes)?;
    let mut text = String::new();

    // get_pages is a BTreeMap keyed by page number.
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(page) if !page.trim().is_empty() => text.push_str(&page),
            Ok(_) => debug!(page = page_number, "Page has no text"),
            Err(e) => debug!(page = page_number, error = %e, "Skipping unreadable page"),
        }
    }

    Ok(text)
}
