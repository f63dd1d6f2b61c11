//! Conversational action orchestrator for a multi-tenant recruiting platform.
//!
//! The crate turns free-text chat into catalogued, permission-checked,
//! organization-scoped tool invocations. Reads execute immediately; writes
//! are parked as pending actions until the caller explicitly confirms them.

pub mod agent;
pub mod catalog;
pub mod context;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod intent;
pub mod llm;

#[cfg(test)]
mod testing;

pub use agent::{
    Agent, Caller, ChatRequest, ChatResponse, ExecuteActionRequest, ExecuteActionResponse,
};
pub use catalog::{Catalog, Role, ToolDefinition, ToolName};
pub use context::Context;
pub use conversation::{ActionStatus, ConversationSummary, Message, PendingAction};
pub use dispatch::{Dispatcher, OrgScope};
pub use error::CopilotError;
pub use intent::{IntentResolver, Resolution};
pub use llm::{Brain, LanguageBackend, LlmError};
