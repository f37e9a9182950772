//! `record_user_details`: capture a visitor who wants to get in touch.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use vitae_core::notify::NotificationSink;
use vitae_core::tool::{decode_args, ParamSpec, ParamType, Tool, ToolArgs, ToolSpec};
use vitae_core::ToolError;

pub struct RecordUserDetailsTool {
    sink: Arc<dyn NotificationSink>,
}

impl RecordUserDetailsTool {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    email: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_notes")]
    notes: String,
}

fn default_name() -> String {
    "Name not provided".into()
}

fn default_notes() -> String {
    "not provided".into()
}

#[async_trait]
impl Tool for RecordUserDetailsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "record_user_details".into(),
            description: "Use this tool to record that a user is interested in being in touch and provided an email address".into(),
            parameters: vec![
                ParamSpec::required("email", ParamType::String, "The email address of this user"),
                ParamSpec::optional("name", ParamType::String, "The user's name, if they provided it"),
                ParamSpec::optional(
                    "notes",
                    ParamType::String,
                    "Any additional information about the conversation that's worth recording to give context",
                ),
            ],
        }
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<serde_json::Value, ToolError> {
        let args: Args = decode_args(arguments)?;
        if args.email.trim().is_empty() {
            return Err(ToolError::InvalidArguments("'email' must not be empty".into()));
        }

        info!("Recording contact details");
        self.sink
            .notify(&format!(
                "Recording {} with email {} and notes {}",
                args.name, args.email, args.notes
            ))
            .await;

        Ok(crate::recorded_ok())
    }
}
