//! Error taxonomy for the orchestrator.
//!
//! Nothing here is fatal to the process: resolution failures fall back to the
//! keyword classifier, and everything else degrades to a conversational error
//! message while leaving conversation state and tenant scoping intact.

use thiserror::Error;

use crate::catalog::{Role, ToolName};
use crate::conversation::ActionStatus;
use crate::llm::LlmError;
use copilot_tools::StoreError;

#[derive(Debug, Error)]
pub enum CopilotError {
    #[error("caller could not be resolved to an organization")]
    Unauthorized,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown tool `{0}`")]
    ToolNotFound(String),

    #[error("role `{role}` is not allowed to use `{tool}`")]
    PermissionDenied { tool: ToolName, role: Role },

    #[error("`{tool}` requires argument `{name}`")]
    MissingArgument { tool: ToolName, name: &'static str },

    #[error("argument `{name}` of `{tool}` is malformed: {message}")]
    InvalidArgument {
        tool: ToolName,
        name: &'static str,
        message: String,
    },

    #[error("conversation `{0}` not found")]
    ConversationNotFound(String),

    #[error("action `{0}` is not the conversation's pending action")]
    StaleAction(String),

    #[error("illegal action transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: ActionStatus,
        to: ActionStatus,
    },

    #[error("language backend: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
