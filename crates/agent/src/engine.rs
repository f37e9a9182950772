//! The turn-resolution loop.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};
use vitae_core::message::{HistoryTurn, Message};
use vitae_core::provider::{ChatProvider, ChatRequest};
use vitae_core::tool::ToolRegistry;
use vitae_core::{Error, KnowledgeContext, ProviderError, ToolCall, ToolError};

use crate::prompt::{format_prompt_date, PromptBuilder};

/// Default ceiling on tool-dispatch rounds per turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 8;

/// The outcome of one resolved turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Final assistant text.
    pub reply: String,
    /// How many tool-dispatch rounds ran before the answer.
    pub rounds: u32,
}

/// Resolves a user message against the model, running requested tools
/// until the model answers without asking for more.
pub struct ConversationEngine {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    knowledge: Arc<KnowledgeContext>,
    persona_name: String,
    model: String,
    temperature: Option<f32>,
    max_tool_rounds: u32,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        knowledge: Arc<KnowledgeContext>,
        persona_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            knowledge,
            persona_name: persona_name.into(),
            model: model.into(),
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the maximum number of tool-dispatch rounds per turn.
    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    /// Resolve a turn dated by the local clock.
    pub async fn resolve(&self, message: &str, history: &[HistoryTurn]) -> Result<Turn, Error> {
        self.resolve_at(message, history, Local::now().date_naive()).await
    }

    /// Resolve a turn as of `today`.
    ///
    /// The message sequence is `[system] + history + [user]`; the system
    /// prompt is rebuilt on every call. Provider failures propagate as
    /// [`Error::ServiceUnavailable`].
    pub async fn resolve_at(
        &self,
        message: &str,
        history: &[HistoryTurn],
        today: NaiveDate,
    ) -> Result<Turn, Error> {
        let system_prompt = PromptBuilder::build(&self.persona_name, &format_prompt_date(today), &self.knowledge);

        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(HistoryTurn::flatten(history));
        messages.push(Message::user(message));

        info!(history_turns = history.len(), "Resolving turn");

        let tool_specs = self.tools.specs();
        let mut rounds = 0;

        loop {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: tool_specs.clone(),
                temperature: self.temperature,
            };

            let response = self.provider.complete(request).await?;
            debug!(
                round = rounds,
                finish_reason = ?response.finish_reason,
                tool_calls = response.message.tool_calls.len(),
                "Completion received"
            );

            let wants_tools =
                response.finish_reason.requests_tools() && !response.message.tool_calls.is_empty();

            if !wants_tools {
                let Some(reply) = response.message.content.clone() else {
                    return Err(Error::ServiceUnavailable(ProviderError::EmptyResponse(
                        "final answer had no content".into(),
                    )));
                };
                info!(rounds, "Turn resolved");
                return Ok(Turn { reply, rounds });
            }

            if rounds >= self.max_tool_rounds {
                warn!(rounds, "Model still requesting tools at the round ceiling");
                return Err(Error::ToolLoopExceeded { rounds });
            }
            rounds += 1;

            let calls = response.message.tool_calls.clone();
            messages.push(response.message);

            for call in &calls {
                let result = self.dispatch(call).await;
                messages.push(Message::tool_result(&call.id, result.to_string()));
            }
        }
    }

    /// Run one call, folding tool failures into the result the model sees.
    async fn dispatch(&self, call: &ToolCall) -> serde_json::Value {
        match self.tools.dispatch(call).await {
            Ok(value) => {
                debug!(tool = %call.name, call_id = %call.id, "Tool succeeded");
                value
            }
            Err(ToolError::MalformedArguments { reason, .. }) => {
                warn!(tool = %call.name, reason = %reason, "Malformed tool arguments, treating as no-op");
                serde_json::json!({})
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool failed");
                serde_json::json!({ "error": e.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vitae_core::message::Role;
    use vitae_core::provider::{ChatResponse, FinishReason};
    use vitae_core::tool::{ParamSpec, ParamType, Tool, ToolArgs, ToolSpec};

    /// Replays canned responses and records every request.
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<ChatResponse, ProviderError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<ChatResponse, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ProviderError::EmptyResponse("script exhausted".into()));
            }
            responses.remove(0)
        }
    }

    fn stop(text: &str) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            finish_reason: FinishReason::Stop,
            message: Message::assistant(text),
            usage: None,
            model: "scripted".into(),
        })
    }

    fn tool_calls(calls: Vec<ToolCall>) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            finish_reason: FinishReason::ToolCalls,
            message: Message::assistant_tool_calls(None, calls),
            usage: None,
            model: "scripted".into(),
        })
    }

    /// Records each `n` it is called with and echoes it back.
    #[derive(Clone, Default)]
    struct CountingTool {
        calls: Arc<Mutex<Vec<i64>>>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "count".into(),
                description: "Counts".into(),
                parameters: vec![ParamSpec::required("n", ParamType::Integer, "A number")],
            }
        }

        async fn execute(&self, arguments: ToolArgs) -> Result<serde_json::Value, ToolError> {
            let n = arguments
                .get("n")
                .and_then(serde_json::Value::as_i64)
                .ok_or_else(|| ToolError::InvalidArguments("missing field `n`".into()))?;
            self.calls.lock().unwrap().push(n);
            Ok(serde_json::json!({ "n": n }))
        }
    }

    fn engine(provider: Arc<ScriptedProvider>, tool: CountingTool) -> ConversationEngine {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(tool)).unwrap();
        ConversationEngine::new(
            provider,
            "gpt-4o-mini",
            Arc::new(registry),
            Arc::new(KnowledgeContext::new("summary text", "profile text")),
            "Ada",
        )
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn plain_answer_builds_message_sequence() {
        let provider = ScriptedProvider::new(vec![stop("Hello there")]);
        let engine = engine(provider.clone(), CountingTool::default());
        let history = vec![HistoryTurn::new("Hi", "Hello!"), HistoryTurn::new("Who are you?", "Ada.")];

        let turn = engine.resolve_at("What do you do?", &history, jan_first()).await.unwrap();

        assert_eq!(turn.reply, "Hello there");
        assert_eq!(turn.rounds, 0);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0].messages;
        let roles: Vec<Role> = sent.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
        assert!(sent[0].text().contains("Today is Monday, January 1, 2024"));
        assert!(sent[0].text().contains("summary text"));
        assert_eq!(sent[5].text(), "What do you do?");
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn tool_round_attaches_results_in_order() {
        let provider = ScriptedProvider::new(vec![
            tool_calls(vec![
                ToolCall::new("call_a", "count", r#"{"n":1}"#),
                ToolCall::new("call_b", "count", r#"{"n":2}"#),
            ]),
            stop("Counted."),
        ]);
        let tool = CountingTool::default();
        let engine = engine(provider.clone(), tool.clone());

        let turn = engine.resolve_at("count please", &[], jan_first()).await.unwrap();

        assert_eq!(turn.reply, "Counted.");
        assert_eq!(turn.rounds, 1);
        assert_eq!(*tool.calls.lock().unwrap(), vec![1, 2]);

        let second = &provider.requests()[1].messages;
        assert_eq!(second.len(), 5);
        assert_eq!(second[2].role, Role::Assistant);
        assert_eq!(second[2].tool_calls.len(), 2);
        assert_eq!(second[3].tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(second[3].text(), r#"{"n":1}"#);
        assert_eq!(second[4].tool_call_id.as_deref(), Some("call_b"));
    }

    #[tokio::test]
    async fn unknown_tool_yields_empty_result_and_continues() {
        let provider = ScriptedProvider::new(vec![
            tool_calls(vec![ToolCall::new("call_x", "does_not_exist", "{}")]),
            stop("Done"),
        ]);
        let engine = engine(provider.clone(), CountingTool::default());

        let turn = engine.resolve_at("hi", &[], jan_first()).await.unwrap();

        assert_eq!(turn.reply, "Done");
        let tool_msg = &provider.requests()[1].messages[3];
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.text(), "{}");
    }

    #[tokio::test]
    async fn malformed_arguments_become_empty_result() {
        let provider = ScriptedProvider::new(vec![
            tool_calls(vec![ToolCall::new("call_m", "count", "{not json")]),
            stop("Recovered"),
        ]);
        let tool = CountingTool::default();
        let engine = engine(provider.clone(), tool.clone());

        let turn = engine.resolve_at("hi", &[], jan_first()).await.unwrap();

        assert_eq!(turn.reply, "Recovered");
        assert!(tool.calls.lock().unwrap().is_empty());
        assert_eq!(provider.requests()[1].messages[3].text(), "{}");
    }

    #[tokio::test]
    async fn handler_error_is_reported_to_model() {
        let provider = ScriptedProvider::new(vec![
            tool_calls(vec![ToolCall::new("call_e", "count", "{}")]),
            stop("Sorry"),
        ]);
        let engine = engine(provider.clone(), CountingTool::default());

        engine.resolve_at("hi", &[], jan_first()).await.unwrap();

        let result: serde_json::Value =
            serde_json::from_str(provider.requests()[1].messages[3].text()).unwrap();
        assert!(result["error"].as_str().unwrap().contains("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn endless_tool_requests_hit_the_ceiling() {
        let responses = (0..10)
            .map(|i| tool_calls(vec![ToolCall::new(format!("call_{i}"), "count", r#"{"n":0}"#)]))
            .collect();
        let provider = ScriptedProvider::new(responses);
        let engine = engine(provider.clone(), CountingTool::default()).with_max_tool_rounds(3);

        let err = engine.resolve_at("loop", &[], jan_first()).await.unwrap_err();

        assert!(matches!(err, Error::ToolLoopExceeded { rounds: 3 }));
        assert_eq!(provider.requests().len(), 4);
    }

    #[tokio::test]
    async fn provider_failure_is_service_unavailable() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::Network("connection reset".into()))]);
        let engine = engine(provider, CountingTool::default());

        let err = engine.resolve_at("hi", &[], jan_first()).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn stop_without_content_is_service_unavailable() {
        let provider = ScriptedProvider::new(vec![Ok(ChatResponse {
            finish_reason: FinishReason::Stop,
            message: Message::assistant_tool_calls(None, vec![]),
            usage: None,
            model: "scripted".into(),
        })]);
        let engine = engine(provider, CountingTool::default());

        let err = engine.resolve_at("hi", &[], jan_first()).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(ProviderError::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn system_prompt_tracks_the_call_date() {
        let provider = ScriptedProvider::new(vec![stop("a"), stop("b")]);
        let engine = engine(provider.clone(), CountingTool::default());

        engine.resolve_at("hi", &[], jan_first()).await.unwrap();
        engine
            .resolve_at("hi", &[], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .await
            .unwrap();

        let requests = provider.requests();
        assert!(requests[0].messages[0].text().contains("Monday, January 1, 2024"));
        assert!(requests[1].messages[0].text().contains("Tuesday, January 2, 2024"));
    }
}
