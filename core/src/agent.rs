//! The orchestrator façade: one entry point per boundary operation.
//!
//! `chat` resolves an utterance and either answers, executes a read tool, or
//! parks a mutating invocation behind the confirmation gate. `execute_action`
//! resumes a parked action on confirm, or discards it on cancel. All tenant
//! scoping flows through [`OrgScope`]; nothing ambient.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::{Catalog, Role};
use crate::context::Context;
use crate::conversation::{
    ActionStatus, ConversationStore, ConversationSummary, Message, PendingAction,
};
use crate::dispatch::{Dispatcher, OrgScope};
use crate::error::CopilotError;
use crate::format::{describe_action, format_error, format_result};
use crate::intent::{IntentResolver, Resolution};
use crate::llm::LanguageBackend;
use copilot_tools::DataStore;

const HELP_REPLY: &str = "I'm your recruitment assistant. You can ask me to:\n\n\
    • **Search** for candidates, jobs, or clients\n\
    • **View** upcoming interviews or dashboard stats\n\
    • **Add notes** to candidates, jobs, or clients\n\n\
    How can I help you today?";

/// The authenticated caller, as resolved by the gateway before any other
/// processing.
#[derive(Debug, Clone)]
pub struct Caller {
    pub organization_id: String,
    pub caller_id: String,
    pub role: Role,
}

impl Caller {
    fn scope(&self) -> OrgScope {
        OrgScope {
            organization_id: self.organization_id.clone(),
            caller_id: self.caller_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    /// The caller's current navigation path; the server derives the rest of
    /// the context from it.
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: Message,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteActionRequest {
    pub action_id: String,
    pub conversation_id: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

pub struct Agent {
    catalog: Catalog,
    resolver: IntentResolver,
    dispatcher: Dispatcher,
    conversations: ConversationStore,
    store: Arc<dyn DataStore>,
}

impl Agent {
    pub fn new(
        store: Arc<dyn DataStore>,
        backend: Option<Arc<dyn LanguageBackend>>,
        backend_timeout: Duration,
    ) -> Self {
        let catalog = Catalog::new();
        Self {
            catalog,
            resolver: IntentResolver::new(catalog, backend, backend_timeout),
            dispatcher: Dispatcher::new(catalog, Arc::clone(&store)),
            conversations: ConversationStore::new(),
            store,
        }
    }

    /// Handles one caller utterance to completion.
    pub async fn chat(
        &self,
        caller: &Caller,
        request: ChatRequest,
    ) -> Result<ChatResponse, CopilotError> {
        if request.message.trim().is_empty() {
            return Err(CopilotError::InvalidRequest("message is required".into()));
        }

        let context = Context::resolve(
            &request.path,
            &caller.organization_id,
            &caller.caller_id,
            caller.role,
        );

        let handle = self
            .conversations
            .open(
                request.conversation_id.as_deref(),
                &caller.organization_id,
                &caller.caller_id,
            )
            .await;
        let mut conversation = handle.lock().await;

        let entity_name = match (&context.entity_type, &context.entity_id) {
            (Some(kind), Some(id)) => {
                self.store
                    .entity_name(&caller.organization_id, *kind, id)
                    .await
            }
            _ => None,
        };

        let history_end = conversation.messages.len();
        conversation.push_user(&request.message);

        let resolution = self
            .resolver
            .resolve(
                &request.message,
                &conversation.messages[..history_end],
                &context,
                entity_name.as_deref(),
            )
            .await;

        match resolution {
            Resolution::Reply(text) => {
                conversation.push_assistant(text, None);
            }
            Resolution::Unresolved => {
                conversation.push_assistant(HELP_REPLY, None);
            }
            Resolution::Invoke(invocation) => {
                let def = self.catalog.get(invocation.tool);
                if !def.allows(caller.role) {
                    warn!(
                        tool = %invocation.tool,
                        role = %caller.role,
                        "permission denied for resolved tool"
                    );
                    let denial = CopilotError::PermissionDenied {
                        tool: invocation.tool,
                        role: caller.role,
                    };
                    conversation
                        .push_assistant(format!("Sorry, {denial}."), Some(invocation.tool));
                } else if def.mutating {
                    let description = describe_action(invocation.tool, &invocation.args);
                    let action =
                        PendingAction::new(invocation.tool, invocation.args, description.clone());
                    let superseded = conversation.propose(action);
                    let mut reply = String::new();
                    if let Some(old) = superseded {
                        warn!(
                            superseded = %old.id,
                            "new mutating proposal supersedes outstanding action"
                        );
                        reply.push_str(&format!(
                            "Note: this replaces the earlier pending action \"{}\", which has \
                             been cancelled.\n\n",
                            old.description
                        ));
                    }
                    reply.push_str(&format!(
                        "I'd like to: **{description}**. Please confirm to proceed."
                    ));
                    conversation.push_assistant(reply, Some(invocation.tool));
                } else {
                    let text = match self
                        .dispatcher
                        .execute(invocation.tool, &invocation.args, &caller.scope())
                        .await
                    {
                        Ok(payload) => format_result(invocation.tool, &payload),
                        Err(
                            e @ (CopilotError::MissingArgument { .. }
                            | CopilotError::InvalidArgument { .. }),
                        ) => format!("I need a bit more information: {e}."),
                        Err(e) => format_error(invocation.tool, &e.to_string()),
                    };
                    conversation.push_assistant(text, Some(invocation.tool));
                }
            }
        }

        let message = conversation
            .messages
            .last()
            .cloned()
            .ok_or_else(|| CopilotError::InvalidRequest("conversation is empty".into()))?;

        Ok(ChatResponse {
            conversation_id: conversation.id.clone(),
            pending_action: conversation.outstanding().cloned(),
            message,
        })
    }

    /// Resolves a pending action: dispatches on confirm, discards on cancel.
    /// A stale or mismatched action id never executes anything.
    pub async fn execute_action(
        &self,
        caller: &Caller,
        request: ExecuteActionRequest,
    ) -> Result<ExecuteActionResponse, CopilotError> {
        if request.action_id.is_empty() || request.conversation_id.is_empty() {
            return Err(CopilotError::InvalidRequest(
                "action ID and conversation ID are required".into(),
            ));
        }

        let handle = self
            .conversations
            .get(
                &request.conversation_id,
                &caller.organization_id,
                &caller.caller_id,
            )
            .await
            .ok_or_else(|| CopilotError::ConversationNotFound(request.conversation_id.clone()))?;
        let mut conversation = handle.lock().await;

        if !request.confirmed {
            if let Some(action) = conversation.pending.as_mut() {
                if action.id == request.action_id && action.status == ActionStatus::Pending {
                    action.transition(ActionStatus::Cancelled)?;
                }
            }
            let message = "Action cancelled. Let me know if you need anything else.".to_string();
            conversation.push_assistant(&message, None);
            return Ok(ExecuteActionResponse {
                success: true,
                message,
                result: None,
            });
        }

        // Confirmation path. The id must match the conversation's current
        // pending action exactly; anything else is a replay or a stale click.
        let (tool, args) = match conversation.pending.as_mut() {
            Some(action)
                if action.status == ActionStatus::Pending && action.id == request.action_id =>
            {
                if action.is_expired(Utc::now()) {
                    action.transition(ActionStatus::Cancelled)?;
                    return Ok(ExecuteActionResponse {
                        success: false,
                        message: "That action expired before it was confirmed. Please ask again."
                            .to_string(),
                        result: None,
                    });
                }
                action.transition(ActionStatus::Confirmed)?;
                (action.tool, action.args.clone())
            }
            _ => {
                return Ok(ExecuteActionResponse {
                    success: false,
                    message: "That action is no longer pending, so nothing was executed."
                        .to_string(),
                    result: None,
                });
            }
        };

        info!(%tool, action = %request.action_id, "executing confirmed action");
        match self.dispatcher.execute(tool, &args, &caller.scope()).await {
            Ok(payload) => {
                if let Some(action) = conversation.pending.as_mut() {
                    action.transition(ActionStatus::Executed)?;
                }
                let message = format_result(tool, &payload);
                conversation.push_assistant(&message, Some(tool));
                Ok(ExecuteActionResponse {
                    success: true,
                    message,
                    result: Some(payload),
                })
            }
            Err(e) => {
                if let Some(action) = conversation.pending.as_mut() {
                    action.transition(ActionStatus::Failed)?;
                }
                let message = format_error(tool, &e.to_string());
                conversation.push_assistant(&message, Some(tool));
                Ok(ExecuteActionResponse {
                    success: false,
                    message,
                    result: None,
                })
            }
        }
    }

    /// The caller's conversations, most recently updated first.
    pub async fn conversations(&self, caller: &Caller) -> Vec<ConversationSummary> {
        self.conversations
            .list(&caller.organization_id, &caller.caller_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolName;
    use crate::testing::FakeBackend;
    use copilot_tools::{Candidate, Job, JobStatus, MemoryStore};

    fn recruiter() -> Caller {
        Caller {
            organization_id: "org-a".into(),
            caller_id: "user-1".into(),
            role: Role::Recruiter,
        }
    }

    fn client() -> Caller {
        Caller {
            role: Role::Client,
            ..recruiter()
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_candidate(Candidate {
                id: "c-42".into(),
                organization_id: "org-a".into(),
                full_name: "Ada Lovelace".into(),
                email: None,
                phone: None,
                current_title: Some("Staff Engineer".into()),
                current_company: None,
                location: None,
                linkedin_url: None,
                source: None,
                created_at: Utc::now(),
            })
            .await;
        store
            .insert_job(Job {
                id: "j-1".into(),
                organization_id: "org-a".into(),
                title: "Platform Engineer".into(),
                status: JobStatus::Active,
                description: None,
                location: Some("Remote".into()),
                employment_type: None,
                seniority: None,
                client_id: None,
                created_at: Utc::now(),
            })
            .await;
        store
    }

    fn agent_with(store: Arc<MemoryStore>, backend: Option<FakeBackend>) -> Agent {
        Agent::new(
            store,
            backend.map(|b| Arc::new(b) as Arc<dyn LanguageBackend>),
            Duration::from_secs(5),
        )
    }

    fn chat_request(message: &str, conversation_id: Option<&str>, path: &str) -> ChatRequest {
        ChatRequest {
            message: message.into(),
            conversation_id: conversation_id.map(str::to_string),
            path: path.into(),
        }
    }

    const ADD_NOTE_REPLY: &str = r#"{"tool": "add_note", "args": {"entity_type": "candidate",
        "entity_id": "c-42", "content": "great culture fit"}}"#;

    #[tokio::test]
    async fn active_jobs_utterance_without_backend_runs_end_to_end() {
        let agent = agent_with(seeded_store().await, None);
        let response = agent
            .chat(&recruiter(), chat_request("Show me active jobs", None, "/dashboard"))
            .await
            .unwrap();

        assert!(response.message.content.starts_with("Found **1** job(s):"));
        assert!(response.message.content.contains("Platform Engineer"));
        assert!(response.message.content.contains("Status: active"));
        assert!(response.message.content.contains("Location: Remote"));
        assert_eq!(response.message.tool_used, Some(ToolName::SearchJobs));
        assert!(response.pending_action.is_none());
    }

    #[tokio::test]
    async fn read_tools_never_create_pending_actions() {
        let agent = agent_with(seeded_store().await, None);
        for utterance in ["dashboard summary", "how many candidates?", "list clients"] {
            let response = agent
                .chat(&recruiter(), chat_request(utterance, None, "/dashboard"))
                .await
                .unwrap();
            assert!(response.pending_action.is_none(), "{utterance}");
        }
    }

    #[tokio::test]
    async fn dashboard_stats_render_zeros_for_an_empty_org() {
        let agent = agent_with(Arc::new(MemoryStore::new()), None);
        let response = agent
            .chat(&recruiter(), chat_request("dashboard summary", None, "/dashboard"))
            .await
            .unwrap();
        assert!(response.message.content.contains("**Total Candidates:** 0"));
        assert!(response.message.content.contains("**Upcoming Interviews:** 0"));
    }

    #[tokio::test]
    async fn mutating_proposal_is_parked_until_confirmed() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));

        let response = agent
            .chat(
                &recruiter(),
                chat_request(
                    "Add a note to this candidate saying great culture fit",
                    None,
                    "/candidates/c-42",
                ),
            )
            .await
            .unwrap();

        let pending = response.pending_action.expect("pending action");
        assert_eq!(pending.status, ActionStatus::Pending);
        assert_eq!(pending.description, "Add note to candidate c-42");
        assert!(pending.requires_confirmation);
        // No write happened yet.
        assert_eq!(store.note_count("org-a").await, 0);

        let executed = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id.clone(),
                    conversation_id: response.conversation_id.clone(),
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(executed.success);
        assert_eq!(store.note_count("org-a").await, 1);
        let notes = store.notes_for("org-a", "c-42").await;
        assert_eq!(notes[0].content, "great culture fit");

        // Replaying the same confirmation does not execute twice.
        let replay = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id,
                    conversation_id: response.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!replay.success);
        assert_eq!(store.note_count("org-a").await, 1);
    }

    #[tokio::test]
    async fn mismatched_action_id_is_rejected_without_dispatch() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));
        let response = agent
            .chat(&recruiter(), chat_request("add a note", None, "/candidates/c-42"))
            .await
            .unwrap();
        let pending = response.pending_action.unwrap();

        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: "action-someone-elses".into(),
                    conversation_id: response.conversation_id.clone(),
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(store.note_count("org-a").await, 0);

        // The real action is still confirmable afterwards.
        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id,
                    conversation_id: response.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(store.note_count("org-a").await, 1);
    }

    #[tokio::test]
    async fn cancel_discards_without_any_write() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));
        let response = agent
            .chat(&recruiter(), chat_request("add a note", None, "/candidates/c-42"))
            .await
            .unwrap();
        let pending = response.pending_action.unwrap();

        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id.clone(),
                    conversation_id: response.conversation_id.clone(),
                    confirmed: false,
                },
            )
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.message.contains("cancelled"));
        assert_eq!(store.note_count("org-a").await, 0);

        // Confirming after the cancel is a stale confirmation.
        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id,
                    conversation_id: response.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(store.note_count("org-a").await, 0);
    }

    #[tokio::test]
    async fn second_mutating_proposal_replaces_with_a_warning() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));

        let first = agent
            .chat(&recruiter(), chat_request("add a note", None, "/candidates/c-42"))
            .await
            .unwrap();
        let first_action = first.pending_action.unwrap();

        let second = agent
            .chat(
                &recruiter(),
                chat_request("add another note", Some(&first.conversation_id), "/candidates/c-42"),
            )
            .await
            .unwrap();
        let second_action = second.pending_action.unwrap();

        assert_ne!(first_action.id, second_action.id);
        assert!(second.message.content.contains("replaces the earlier pending action"));

        // The superseded action can no longer be confirmed.
        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: first_action.id,
                    conversation_id: second.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(store.note_count("org-a").await, 0);
    }

    #[tokio::test]
    async fn permission_denied_is_a_distinct_conversational_rejection() {
        let agent = agent_with(
            seeded_store().await,
            Some(FakeBackend::replies(
                r#"{"tool": "create_candidate", "args": {"full_name": "Eve"}}"#,
            )),
        );
        let response = agent
            .chat(&client(), chat_request("add candidate Eve", None, "/candidates"))
            .await
            .unwrap();
        assert!(response.pending_action.is_none());
        assert!(response.message.content.contains("not allowed"));
        assert!(response.message.content.contains("create_candidate"));
    }

    #[tokio::test]
    async fn free_text_reply_is_relayed_with_no_pending_action() {
        let agent = agent_with(
            seeded_store().await,
            Some(FakeBackend::replies("I'm here to help with recruiting.")),
        );
        let response = agent
            .chat(&recruiter(), chat_request("who are you?", None, "/dashboard"))
            .await
            .unwrap();
        assert_eq!(response.message.content, "I'm here to help with recruiting.");
        assert!(response.pending_action.is_none());
        assert_eq!(response.message.tool_used, None);
    }

    #[tokio::test]
    async fn unresolvable_utterance_gets_the_help_reply() {
        let agent = agent_with(seeded_store().await, None);
        let response = agent
            .chat(&recruiter(), chat_request("zzz nothing matches", None, "/dashboard"))
            .await
            .unwrap();
        assert!(response.message.content.contains("recruitment assistant"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_any_state_is_created() {
        let agent = agent_with(seeded_store().await, None);
        let err = agent
            .chat(&recruiter(), chat_request("   ", None, "/dashboard"))
            .await
            .unwrap_err();
        assert!(matches!(err, CopilotError::InvalidRequest(_)));
        assert!(agent.conversations(&recruiter()).await.is_empty());
    }

    #[tokio::test]
    async fn conversations_are_listed_per_caller_most_recent_first() {
        let agent = agent_with(seeded_store().await, None);
        let first = agent
            .chat(&recruiter(), chat_request("dashboard summary", None, "/dashboard"))
            .await
            .unwrap();
        agent
            .chat(&recruiter(), chat_request("list clients", None, "/clients"))
            .await
            .unwrap();

        let listed = agent.conversations(&recruiter()).await;
        assert_eq!(listed.len(), 2);
        assert_ne!(listed[0].id, first.conversation_id);

        // Another caller in the same org sees nothing.
        let other = Caller {
            caller_id: "user-2".into(),
            ..recruiter()
        };
        assert!(agent.conversations(&other).await.is_empty());
    }

    #[tokio::test]
    async fn execute_against_foreign_conversation_is_not_found() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));
        let response = agent
            .chat(&recruiter(), chat_request("add a note", None, "/candidates/c-42"))
            .await
            .unwrap();
        let pending = response.pending_action.unwrap();

        let intruder = Caller {
            organization_id: "org-b".into(),
            ..recruiter()
        };
        let err = agent
            .execute_action(
                &intruder,
                ExecuteActionRequest {
                    action_id: pending.id,
                    conversation_id: response.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CopilotError::ConversationNotFound(_)));
        assert_eq!(store.note_count("org-a").await, 0);
    }

    #[tokio::test]
    async fn expired_pending_action_cannot_be_confirmed() {
        let store = seeded_store().await;
        let agent = agent_with(Arc::clone(&store), Some(FakeBackend::replies(ADD_NOTE_REPLY)));
        let response = agent
            .chat(&recruiter(), chat_request("add a note", None, "/candidates/c-42"))
            .await
            .unwrap();
        let pending = response.pending_action.unwrap();

        // Backdate the action past the TTL.
        {
            let handle = agent
                .conversations
                .get(&response.conversation_id, "org-a", "user-1")
                .await
                .unwrap();
            let mut conversation = handle.lock().await;
            let action = conversation.pending.as_mut().unwrap();
            action.created_at = Utc::now()
                - chrono::Duration::minutes(crate::conversation::PENDING_ACTION_TTL_MINUTES + 1);
        }

        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id,
                    conversation_id: response.conversation_id,
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("expired"));
        assert_eq!(store.note_count("org-a").await, 0);
    }

    #[tokio::test]
    async fn dispatch_failure_marks_the_action_failed() {
        // Note targets a candidate, but the add_note handler does not check
        // the entity, so use schedule_interview against a missing application
        // to force a store error after confirmation.
        let store = seeded_store().await;
        let agent = agent_with(
            Arc::clone(&store),
            Some(FakeBackend::replies(
                r#"{"tool": "schedule_interview", "args": {"application_id": "app-missing",
                    "scheduled_at": "2026-09-01T10:00:00Z"}}"#,
            )),
        );
        let response = agent
            .chat(&recruiter(), chat_request("schedule the interview", None, "/dashboard"))
            .await
            .unwrap();
        let pending = response.pending_action.unwrap();

        let result = agent
            .execute_action(
                &recruiter(),
                ExecuteActionRequest {
                    action_id: pending.id.clone(),
                    conversation_id: response.conversation_id.clone(),
                    confirmed: true,
                },
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("not found"));

        // The action is terminal (failed), not stuck in confirmed.
        let handle = agent
            .conversations
            .get(&response.conversation_id, "org-a", "user-1")
            .await
            .unwrap();
        let conversation = handle.lock().await;
        assert_eq!(
            conversation.pending.as_ref().unwrap().status,
            ActionStatus::Failed
        );
    }
}
