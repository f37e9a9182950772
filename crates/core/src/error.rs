//! Error types for the Vitae domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] is what a turn's
//! caller sees.

use thiserror::Error;

/// The top-level error type for a conversational turn.
#[derive(Debug, Error)]
pub enum Error {
    /// The completion (or speech) backend could not serve the request.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(#[from] ProviderError),

    /// The model kept requesting tools past the configured ceiling.
    #[error("Tool loop exceeded: model still requested tools after {rounds} dispatch rounds")]
    ToolLoopExceeded { rounds: u32 },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider returned an empty response: {0}")]
    EmptyResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Classify a transport error from `reqwest`-style clients.
    ///
    /// Kept string-based so this crate stays free of HTTP dependencies.
    pub fn transport(is_timeout: bool, detail: impl Into<String>) -> Self {
        if is_timeout {
            Self::Timeout(detail.into())
        } else {
            Self::Network(detail.into())
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    #[error("Malformed arguments for {tool_name}: {reason}")]
    MalformedArguments { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool {tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_as_service_unavailable() {
        let err = Error::from(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().starts_with("Service unavailable"));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn tool_loop_error_reports_rounds() {
        let err = Error::ToolLoopExceeded { rounds: 8 };
        assert!(err.to_string().contains("8 dispatch rounds"));
    }

    #[test]
    fn transport_classification() {
        assert!(matches!(
            ProviderError::transport(true, "deadline"),
            ProviderError::Timeout(_)
        ));
        assert!(matches!(
            ProviderError::transport(false, "refused"),
            ProviderError::Network(_)
        ));
    }
}
