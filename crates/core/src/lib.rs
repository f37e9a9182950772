//! # Vitae Core
//!
//! Domain types, traits, and error definitions for the Vitae persona chat
//! assistant. This crate has **no transport dependencies**: it defines the
//! model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external collaborator (chat completion, speech, notifications) is a
//! trait here. Implementations live in their own crates, so the turn loop can
//! be driven by scripted test doubles as easily as by real HTTP backends.

pub mod error;
pub mod knowledge;
pub mod message;
pub mod notify;
pub mod provider;
pub mod speech;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use knowledge::KnowledgeContext;
pub use message::{HistoryTurn, Message, Role, ToolCall};
pub use notify::NotificationSink;
pub use provider::{ChatProvider, ChatRequest, ChatResponse, FinishReason, Usage};
pub use speech::{SpeechSynthesizer, SpeechTranscriber};
pub use tool::{ParamSpec, ParamType, Tool, ToolArgs, ToolRegistry, ToolSpec};
