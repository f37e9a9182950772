//! Chat completion provider trait: the abstraction over LLM backends.
//!
//! A provider takes the full message sequence plus the tool specs and
//! returns one completion: either a final answer or a batch of tool calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;
use crate::tool::ToolSpec;

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// The ordered message sequence, system prompt first
    pub messages: Vec<Message>,

    /// Tools the model may request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    /// Sampling temperature; provider default when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Normal end of answer
    Stop,
    /// The model wants tools invoked before it answers
    ToolCalls,
    /// Output token limit reached
    Length,
    /// Anything else the backend reports
    #[serde(untagged)]
    Other(String),
}

impl FinishReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "stop" => Self::Stop,
            "tool_calls" | "function_call" => Self::ToolCalls,
            "length" => Self::Length,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn requests_tools(&self) -> bool {
        matches!(self, Self::ToolCalls)
    }
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Why generation stopped
    pub finish_reason: FinishReason,

    /// The assistant message, including any tool calls
    pub message: Message,

    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The chat completion service.
///
/// Every backend implements this; the conversation engine calls
/// `complete()` without knowing which one is behind it.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A human-readable name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reason_parsing() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("tool_calls"), FinishReason::ToolCalls);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(
            FinishReason::parse("content_filter"),
            FinishReason::Other("content_filter".into())
        );
    }

    #[test]
    fn only_tool_calls_requests_tools() {
        assert!(FinishReason::ToolCalls.requests_tools());
        assert!(!FinishReason::Stop.requests_tools());
        assert!(!FinishReason::Length.requests_tools());
    }
}
