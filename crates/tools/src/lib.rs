//! Built-in tool implementations for Vitae.
//!
//! Both tools are side-effecting recorders: they push a notification to the
//! persona's owner and acknowledge with `{"recorded": "ok"}`.

pub mod record_unknown_question;
pub mod record_user_details;

use std::sync::Arc;

use vitae_core::notify::NotificationSink;
use vitae_core::tool::ToolRegistry;
use vitae_core::ToolError;

pub use record_unknown_question::RecordUnknownQuestionTool;
pub use record_user_details::RecordUserDetailsTool;

/// The acknowledgement every recorder returns.
pub(crate) fn recorded_ok() -> serde_json::Value {
    serde_json::json!({ "recorded": "ok" })
}

/// Create the registry with both recorder tools wired to `sink`.
pub fn default_registry(sink: Arc<dyn NotificationSink>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordUserDetailsTool::new(sink.clone())))?;
    registry.register(Box::new(RecordUnknownQuestionTool::new(sink)))?;
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vitae_core::notify::NotificationSink;

    /// Captures every notification text.
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn notify(&self, text: &str) {
            self.sent.lock().unwrap().push(text.to_string());
        }
    }
}
