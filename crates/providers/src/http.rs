//! Shared HTTP plumbing: client construction and status classification.

use std::time::Duration;

use tracing::warn;
use vitae_core::ProviderError;

/// Build the HTTP client used by every provider.
///
/// The timeout applies per request; expiry surfaces as [`ProviderError::Timeout`].
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("failed to create HTTP client: {e}")))
}

/// Map a `reqwest` transport failure onto the provider taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::transport(e.is_timeout(), e.to_string())
}

/// Turn non-success statuses into typed errors; pass successes through.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider, status, body = %error_body, "Provider returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}
