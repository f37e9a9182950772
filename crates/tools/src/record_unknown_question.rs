//! `record_unknown_question`: log a question the persona could not answer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use vitae_core::notify::NotificationSink;
use vitae_core::tool::{decode_args, ParamSpec, ParamType, Tool, ToolArgs, ToolSpec};
use vitae_core::ToolError;

pub struct RecordUnknownQuestionTool {
    sink: Arc<dyn NotificationSink>,
}

impl RecordUnknownQuestionTool {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    question: String,
}

#[async_trait]
impl Tool for RecordUnknownQuestionTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "record_unknown_question".into(),
            description: "Always use this tool to record any question that couldn't be answered as you didn't know the answer".into(),
            parameters: vec![ParamSpec::required(
                "question",
                ParamType::String,
                "The question that couldn't be answered",
            )],
        }
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<serde_json::Value, ToolError> {
        let args: Args = decode_args(arguments)?;

        info!(chars = args.question.len(), "Recording unknown question");
        self.sink.notify(&format!("Recording {}", args.question)).await;

        Ok(crate::recorded_ok())
    }
}
