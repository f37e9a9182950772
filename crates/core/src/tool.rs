//! Tool trait and registry: the side-effecting operations a model may request.
//!
//! Tools are registered once at startup into an explicit name → handler
//! mapping. The conversation engine asks the registry for specs to send to
//! the model and dispatches the model's tool calls back through it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::message::ToolCall;

/// Decoded tool arguments: parameter name → value.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Contract for a single tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Name, description and parameter contract of a tool, as sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    /// Render the parameter contract as a JSON Schema object.
    ///
    /// Unknown properties are rejected by the schema.
    pub fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": param.param_type,
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// A callable side-effecting operation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's contract. The name must be unique within a registry.
    fn spec(&self) -> ToolSpec;

    /// Execute with decoded arguments. The result must be JSON-serializable.
    async fn execute(&self, arguments: ToolArgs) -> Result<serde_json::Value, ToolError>;
}

/// Decode tool arguments into a typed parameter struct.
///
/// Missing optional parameters are filled by the struct's serde defaults.
pub fn decode_args<T: DeserializeOwned>(arguments: ToolArgs) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// The explicit name → tool mapping built at startup.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Names must be disjoint.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.spec().name;
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.tools
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// All tool specs, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.spec())
            .collect()
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Decode a call's arguments and run the named tool.
    ///
    /// Fails with [`ToolError::MalformedArguments`] when the payload is not a
    /// JSON object. An unregistered name yields `{}` rather than an error.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
        let arguments = parse_arguments(call)?;

        match self.resolve(&call.name) {
            Ok(tool) => {
                debug!(tool = %call.name, call_id = %call.id, "Dispatching tool call");
                tool.execute(arguments).await
            }
            Err(_) => {
                warn!(tool = %call.name, call_id = %call.id, "Model requested an unregistered tool");
                Ok(serde_json::json!({}))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// An empty or whitespace payload counts as "no arguments".
fn parse_arguments(call: &ToolCall) -> Result<ToolArgs, ToolError> {
    if call.arguments.trim().is_empty() {
        return Ok(ToolArgs::new());
    }
    let malformed = |reason: String| ToolError::MalformedArguments {
        tool_name: call.name.clone(),
        reason,
    };
    match serde_json::from_str::<serde_json::Value>(&call.arguments) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!("expected a JSON object, got {other}"))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default = "default_suffix")]
        suffix: String,
    }

    fn default_suffix() -> String {
        "!".into()
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: "Echoes back the input".into(),
                parameters: vec![
                    ParamSpec::required("text", ParamType::String, "Text to echo"),
                    ParamSpec::optional("suffix", ParamType::String, "Appended text"),
                ],
            }
        }

        async fn execute(&self, arguments: ToolArgs) -> Result<serde_json::Value, ToolError> {
            let args: EchoArgs = decode_args(arguments)?;
            Ok(serde_json::json!({ "echo": format!("{}{}", args.text, args.suffix) }))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry
    }

    #[test]
    fn register_and_resolve() {
        let registry = registry();
        assert!(registry.resolve("echo").is_ok());
        assert!(matches!(registry.resolve("nonexistent"), Err(ToolError::NotFound(_))));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut registry = registry();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn schema_lists_required_params() {
        let schema = EchoTool.spec().parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["text"]));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[tokio::test]
    async fn dispatch_applies_defaults() {
        let call = ToolCall::new("call_1", "echo", r#"{"text":"hello"}"#);
        let result = registry().dispatch(&call).await.unwrap();
        assert_eq!(result, serde_json::json!({"echo": "hello!"}));
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_yields_empty_object() {
        let call = ToolCall::new("call_1", "nonexistent", r#"{"x":1}"#);
        let result = registry().dispatch(&call).await.unwrap();
        assert_eq!(result, serde_json::json!({}));
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_arguments() {
        let call = ToolCall::new("call_1", "echo", "{not json");
        let err = registry().dispatch(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));

        let call = ToolCall::new("call_2", "echo", "[1, 2]");
        let err = registry().dispatch(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[tokio::test]
    async fn dispatch_missing_required_param_is_invalid() {
        let call = ToolCall::new("call_1", "echo", "{}");
        let err = registry().dispatch(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
