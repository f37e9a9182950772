//! The persona conversation loop.
//!
//! A turn follows a **Build → Ask → Dispatch** cycle:
//!
//! 1. **Build** the message sequence: fresh system prompt, flattened history,
//!    the new user message
//! 2. **Ask** the completion service, offering the registered tools
//! 3. **If tool calls**: dispatch each one in order, append one tool result
//!    per call, and ask again
//! 4. **If text**: return it as the turn's reply
//!
//! Dispatch rounds are bounded by `max_tool_rounds`; a model that keeps
//! asking for tools past it fails the turn with `ToolLoopExceeded`.

pub mod engine;
pub mod prompt;

pub use engine::{ConversationEngine, Turn, DEFAULT_MAX_TOOL_ROUNDS};
pub use prompt::{format_prompt_date, PromptBuilder};
