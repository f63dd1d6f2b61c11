//! Conversation state: append-only message log plus the confirmation gate's
//! pending-action state machine.
//!
//! Invariant: a conversation holds zero or one non-terminal pending action.
//! Mutating proposals never queue; a newer one supersedes the outstanding one
//! explicitly (the superseded action is cancelled and the caller is told).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::catalog::ToolName;
use crate::error::CopilotError;

/// How long an unconfirmed action stays confirmable. Checked lazily when a
/// confirmation arrives; there is no background sweeper.
pub const PENDING_ACTION_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_used: Option<ToolName>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_used: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Confirmed,
    Executed,
    Failed,
    Cancelled,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionStatus::Executed | ActionStatus::Failed | ActionStatus::Cancelled
        )
    }
}

/// A proposed mutating invocation awaiting explicit caller confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    pub tool: ToolName,
    pub args: Map<String, Value>,
    pub description: String,
    pub status: ActionStatus,
    pub requires_confirmation: bool,
    pub created_at: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(tool: ToolName, args: Map<String, Value>, description: String) -> Self {
        Self {
            id: format!("action-{}", Uuid::new_v4()),
            tool,
            args,
            description,
            status: ActionStatus::Pending,
            requires_confirmation: true,
            created_at: Utc::now(),
        }
    }

    /// Legal transitions: pending -> confirmed | cancelled,
    /// confirmed -> executed | failed. Everything else is refused.
    pub fn transition(&mut self, next: ActionStatus) -> Result<(), CopilotError> {
        let legal = matches!(
            (self.status, next),
            (ActionStatus::Pending, ActionStatus::Confirmed)
                | (ActionStatus::Pending, ActionStatus::Cancelled)
                | (ActionStatus::Confirmed, ActionStatus::Executed)
                | (ActionStatus::Confirmed, ActionStatus::Failed)
        );
        if !legal {
            return Err(CopilotError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(PENDING_ACTION_TTL_MINUTES)
    }
}

#[derive(Debug)]
pub struct Conversation {
    pub id: String,
    pub organization_id: String,
    pub caller_id: String,
    pub messages: Vec<Message>,
    pub pending: Option<PendingAction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(organization_id: &str, caller_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("conv-{}", Uuid::new_v4()),
            organization_id: organization_id.to_string(),
            caller_id: caller_id.to_string(),
            messages: Vec::new(),
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &Message {
        self.push(Message::new(MessageRole::User, content))
    }

    pub fn push_assistant(
        &mut self,
        content: impl Into<String>,
        tool_used: Option<ToolName>,
    ) -> &Message {
        let mut message = Message::new(MessageRole::Assistant, content);
        message.tool_used = tool_used;
        self.push(message)
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        self.updated_at = Utc::now();
        self.messages
            .last()
            .unwrap_or_else(|| unreachable!("message was just pushed"))
    }

    /// The outstanding (non-terminal) pending action, if any.
    pub fn outstanding(&self) -> Option<&PendingAction> {
        self.pending.as_ref().filter(|a| !a.status.is_terminal())
    }

    /// Installs a new pending action. If one is already outstanding it is
    /// cancelled and returned so the caller can surface the supersession.
    pub fn propose(&mut self, action: PendingAction) -> Option<PendingAction> {
        let superseded = match self.pending.take() {
            Some(mut old) if !old.status.is_terminal() => {
                // Cancelling a pending action is always legal.
                let _ = old.transition(ActionStatus::Cancelled);
                Some(old)
            }
            _ => None,
        };
        self.pending = Some(action);
        self.updated_at = Utc::now();
        superseded
    }
}

/// Lightweight listing view of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: Option<String>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-process conversation registry. Each conversation sits behind its own
/// async mutex, so two requests against the same conversation serialize
/// instead of racing; the stale-action-id check catches replays on top.
#[derive(Default)]
pub struct ConversationStore {
    inner: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an existing conversation or starts a fresh one. A missing id,
    /// a client-side placeholder (`temp-*`), an unknown id, or an id owned by
    /// a different caller all start a new conversation.
    pub async fn open(
        &self,
        requested: Option<&str>,
        organization_id: &str,
        caller_id: &str,
    ) -> Arc<Mutex<Conversation>> {
        if let Some(id) = requested.filter(|id| !id.starts_with("temp-")) {
            if let Some(handle) = self.get(id, organization_id, caller_id).await {
                return handle;
            }
        }

        let conversation = Conversation::new(organization_id, caller_id);
        let id = conversation.id.clone();
        let handle = Arc::new(Mutex::new(conversation));
        self.inner.write().await.insert(id, Arc::clone(&handle));
        handle
    }

    /// Owner-checked lookup: the conversation must belong to the caller within
    /// the caller's organization.
    pub async fn get(
        &self,
        id: &str,
        organization_id: &str,
        caller_id: &str,
    ) -> Option<Arc<Mutex<Conversation>>> {
        let handle = self.inner.read().await.get(id).cloned()?;
        {
            let conversation = handle.lock().await;
            if conversation.organization_id != organization_id
                || conversation.caller_id != caller_id
            {
                return None;
            }
        }
        Some(handle)
    }

    /// The caller's conversations, most recently updated first.
    pub async fn list(&self, organization_id: &str, caller_id: &str) -> Vec<ConversationSummary> {
        let handles: Vec<_> = self.inner.read().await.values().cloned().collect();
        let mut summaries = Vec::new();
        for handle in handles {
            let conversation = handle.lock().await;
            if conversation.organization_id != organization_id
                || conversation.caller_id != caller_id
            {
                continue;
            }
            let title = conversation
                .messages
                .iter()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.content.chars().take(60).collect());
            summaries.push(ConversationSummary {
                id: conversation.id.clone(),
                title,
                message_count: conversation.messages.len(),
                created_at: conversation.created_at,
                updated_at: conversation.updated_at,
            });
        }
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }
}
