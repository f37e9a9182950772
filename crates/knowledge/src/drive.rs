//! Google Drive share-link rewriting.
//!
//! Share links point at an HTML viewer page. Downloads need the
//! `uc?export=download&id=<id>` form instead.

use url::Url;

use crate::error::IngestError;

const DRIVE_HOST: &str = "drive.google.com";

/// Parse `raw` and, if it is a Drive share link, rewrite it into a direct
/// download URL. Any other URL is returned as parsed.
pub fn direct_download_url(raw: &str) -> Result<Url, IngestError> {
    let url = Url::parse(raw.trim()).map_err(|e| IngestError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str() != Some(DRIVE_HOST) {
        return Ok(url);
    }

    match drive_file_id(&url) {
        Some(id) => {
            let mut direct = Url::parse("https://drive.google.com/uc").map_err(|e| IngestError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
            direct
                .query_pairs_mut()
                .append_pair("export", "download")
                .append_pair("id", &id);
            Ok(direct)
        }
        None => Ok(url),
    }
}

/// `/file/d/<id>/...` or `?id=<id>`.
fn drive_file_id(url: &Url) -> Option<String> {
    if let Some(mut segments) = url.path_segments() {
        if segments.next() == Some("file") && segments.next() == Some("d") {
            if let Some(id) = segments.next().filter(|s| !s.is_empty()) {
                return Some(id.to_string());
            }
        }
    }
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
