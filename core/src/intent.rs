//! Dual-path intent resolution: the language model first, a deterministic
//! keyword classifier whenever the model is absent, slow, or off-format.
//!
//! The fallback keeps the orchestrator useful and testable with no model
//! configured at all; nothing in this module returns an error to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::catalog::{Catalog, ToolName};
use crate::context::Context;
use crate::conversation::Message;
use crate::llm::LanguageBackend;

/// A tool name plus arguments suggested by resolution, not yet executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedInvocation {
    pub tool: ToolName,
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A catalogue tool should run (or be confirmed) with these arguments.
    Invoke(ProposedInvocation),
    /// No tool needed; relay the model's free-text answer verbatim.
    Reply(String),
    /// Neither path produced anything usable.
    Unresolved,
}

/// Scans free-form model output for an embedded `{"tool": ..., "args": ...}`
/// object: first `{` through last `}`, strict parse, string `tool` field
/// required. Any failure is "no tool parsed", never an error.
pub fn parse_tool_call(content: &str) -> Option<(String, Map<String, Value>)> {
    let trimmed = content.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }

    let parsed: Value = serde_json::from_str(&trimmed[start..=end]).ok()?;
    let tool = parsed.get("tool")?.as_str()?.to_string();
    let args = match parsed.get("args") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    Some((tool, args))
}

/// Deterministic keyword classifier over the lowercased utterance. First
/// match wins; checked in a fixed order so behavior is reproducible.
pub fn detect_intent(message: &str) -> Option<ProposedInvocation> {
    let lower = message.to_lowercase();
    let mut args = Map::new();

    if lower.contains("dashboard")
        || lower.contains("summary")
        || lower.contains("stats")
        || lower.contains("statistics")
    {
        return Some(ProposedInvocation {
            tool: ToolName::GetDashboardStats,
            args,
        });
    }

    if lower.contains("job") || lower.contains("position") || lower.contains("opening") {
        if lower.contains("active") || lower.contains("live") || lower.contains("open") {
            args.insert("status".into(), Value::from("active"));
        }
        if lower.contains("how many") {
            args.insert("limit".into(), Value::from(100));
        }
        return Some(ProposedInvocation {
            tool: ToolName::SearchJobs,
            args,
        });
    }

    if lower.contains("candidate") || lower.contains("applicant") || lower.contains("talent") {
        if lower.contains("how many") {
            args.insert("limit".into(), Value::from(100));
        }
        return Some(ProposedInvocation {
            tool: ToolName::SearchCandidates,
            args,
        });
    }

    if lower.contains("interview")
        && (lower.contains("upcoming") || lower.contains("scheduled") || lower.contains("coming"))
    {
        return Some(ProposedInvocation {
            tool: ToolName::GetUpcomingInterviews,
            args,
        });
    }

    if lower.contains("client") || lower.contains("company") {
        return Some(ProposedInvocation {
            tool: ToolName::SearchClients,
            args,
        });
    }

    None
}

/// Builds the system prompt: persona, catalogue listing, and the caller's
/// current location.
pub fn system_prompt(catalog: &Catalog, context: &Context, entity_name: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an AI assistant for a recruitment platform. You help recruiters and hiring \
         managers manage candidates, jobs, applications, and interviews.\n\n## Available Tools:\n",
    );
    for def in catalog.all() {
        prompt.push_str(&format!("- **{}**: {}\n", def.name, def.description));
    }
    prompt.push_str(
        "\n## CRITICAL INSTRUCTIONS:\nWhen you need data from the system, you MUST respond with \
         ONLY a JSON object, no other text:\n{\"tool\": \"tool_name\", \"args\": {\"arg1\": \
         \"value1\"}}\n\nExamples:\n- User: \"Show me active jobs\" -> {\"tool\": \
         \"search_jobs\", \"args\": {\"status\": \"active\"}}\n- User: \"Dashboard summary\" -> \
         {\"tool\": \"get_dashboard_stats\", \"args\": {}}\n\nFor general questions about your \
         capabilities or the current page, respond normally with helpful text.",
    );
    if let (Some(kind), Some(name)) = (context.entity_type, entity_name) {
        prompt.push_str(&format!(
            "\n\nThe user is currently viewing {} \"{}\".",
            kind.as_str(),
            name
        ));
    }
    prompt.push_str(&format!("\n\nCurrent page: {}", context.current_page));
    prompt
}

pub struct IntentResolver {
    catalog: Catalog,
    backend: Option<Arc<dyn LanguageBackend>>,
    backend_timeout: Duration,
}

impl IntentResolver {
    pub fn new(
        catalog: Catalog,
        backend: Option<Arc<dyn LanguageBackend>>,
        backend_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            backend,
            backend_timeout,
        }
    }

    /// Resolves an utterance to zero or one proposed invocation.
    ///
    /// Primary path: the language backend, bounded by a timeout; expiry and
    /// transport errors route to the fallback instead of surfacing. A model
    /// reply naming a tool outside the catalogue is logged and treated as
    /// unusable output.
    pub async fn resolve(
        &self,
        utterance: &str,
        history: &[Message],
        context: &Context,
        entity_name: Option<&str>,
    ) -> Resolution {
        let mut free_text: Option<String> = None;

        if let Some(backend) = &self.backend {
            let system = system_prompt(&self.catalog, context, entity_name);
            match timeout(
                self.backend_timeout,
                backend.complete(&system, history, utterance),
            )
            .await
            {
                Ok(Ok(reply)) => match parse_tool_call(&reply) {
                    Some((name, args)) => match ToolName::parse(&name) {
                        Some(tool) => {
                            debug!(%tool, "model selected tool");
                            return Resolution::Invoke(ProposedInvocation { tool, args });
                        }
                        None => {
                            warn!(tool = %name, "model proposed a tool that is not in the catalogue");
                        }
                    },
                    None => {
                        let trimmed = reply.trim();
                        if !trimmed.is_empty() {
                            free_text = Some(trimmed.to_string());
                        }
                    }
                },
                Ok(Err(e)) => warn!(error = %e, "language backend failed, using fallback"),
                Err(_) => warn!("language backend timed out, using fallback"),
            }
        }

        if let Some(invocation) = detect_intent(utterance) {
            debug!(tool = %invocation.tool, "fallback classifier matched");
            return Resolution::Invoke(invocation);
        }

        match free_text {
            Some(text) => Resolution::Reply(text),
            None => Resolution::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use crate::llm::LlmError;
    use crate::testing::FakeBackend;

    fn context() -> Context {
        Context::resolve("/dashboard", "org-1", "user-1", Role::Recruiter)
    }

    fn resolver(backend: Option<FakeBackend>) -> IntentResolver {
        IntentResolver::new(
            Catalog::new(),
            backend.map(|b| Arc::new(b) as Arc<dyn LanguageBackend>),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn parses_tool_call_surrounded_by_prose() {
        let reply = r#"Sure, let me look that up.
            {"tool": "search_jobs", "args": {"status": "active"}}
            Hope that helps!"#;
        let (tool, args) = parse_tool_call(reply).unwrap();
        assert_eq!(tool, "search_jobs");
        assert_eq!(args.get("status").unwrap(), "active");
    }

    #[test]
    fn missing_or_malformed_json_yields_no_tool() {
        assert_eq!(parse_tool_call("I can help with recruiting tasks."), None);
        assert_eq!(parse_tool_call("{not json at all}"), None);
        assert_eq!(parse_tool_call(r#"{"args": {"x": 1}}"#), None);
        assert_eq!(parse_tool_call(r#"{"tool": 42}"#), None);
        assert_eq!(parse_tool_call("}{"), None);
    }

    #[test]
    fn args_default_to_empty_object() {
        let (tool, args) = parse_tool_call(r#"{"tool": "get_dashboard_stats"}"#).unwrap();
        assert_eq!(tool, "get_dashboard_stats");
        assert!(args.is_empty());
    }

    #[test]
    fn keyword_classifier_covers_the_domain_terms() {
        let jobs = detect_intent("Show me active jobs").unwrap();
        assert_eq!(jobs.tool, ToolName::SearchJobs);
        assert_eq!(jobs.args.get("status").unwrap(), "active");

        let count = detect_intent("How many open positions do we have?").unwrap();
        assert_eq!(count.tool, ToolName::SearchJobs);
        assert_eq!(count.args.get("limit").unwrap(), 100);

        assert_eq!(
            detect_intent("dashboard summary please").unwrap().tool,
            ToolName::GetDashboardStats
        );
        assert_eq!(
            detect_intent("find me some talent").unwrap().tool,
            ToolName::SearchCandidates
        );
        assert_eq!(
            detect_intent("any upcoming interviews?").unwrap().tool,
            ToolName::GetUpcomingInterviews
        );
        assert_eq!(
            detect_intent("list our clients").unwrap().tool,
            ToolName::SearchClients
        );
        assert_eq!(detect_intent("hello there"), None);
    }

    #[test]
    fn interviews_without_schedule_words_do_not_match() {
        // "interview" alone is ambiguous; the classifier requires a schedule
        // word alongside it.
        assert_eq!(detect_intent("tell me about interviews in general"), None);
    }

    #[tokio::test]
    async fn no_backend_routes_straight_to_fallback() {
        let resolver = resolver(None);
        match resolver.resolve("Show me active jobs", &[], &context(), None).await {
            Resolution::Invoke(inv) => {
                assert_eq!(inv.tool, ToolName::SearchJobs);
                assert_eq!(inv.args.get("status").unwrap(), "active");
            }
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn model_json_wins_over_the_classifier() {
        let resolver = resolver(Some(FakeBackend::replies(
            r#"{"tool": "search_candidates", "args": {"location": "Oslo"}}"#,
        )));
        match resolver.resolve("Show me active jobs", &[], &context(), None).await {
            Resolution::Invoke(inv) => assert_eq!(inv.tool, ToolName::SearchCandidates),
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn free_text_with_no_keyword_match_is_relayed_verbatim() {
        let resolver = resolver(Some(FakeBackend::replies(
            "I can search the system for you, among other things.",
        )));
        match resolver.resolve("what can you do?", &[], &context(), None).await {
            Resolution::Reply(text) => {
                assert_eq!(text, "I can search the system for you, among other things.")
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn free_text_still_falls_back_when_a_keyword_matches() {
        let resolver = resolver(Some(FakeBackend::replies(
            "Jobs are listed on the jobs page.",
        )));
        match resolver.resolve("show me active jobs", &[], &context(), None).await {
            Resolution::Invoke(inv) => assert_eq!(inv.tool, ToolName::SearchJobs),
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_error_routes_to_fallback() {
        let resolver = resolver(Some(FakeBackend::fails(LlmError::Api(
            "connection refused".into(),
        ))));
        match resolver.resolve("how many candidates?", &[], &context(), None).await {
            Resolution::Invoke(inv) => {
                assert_eq!(inv.tool, ToolName::SearchCandidates);
                assert_eq!(inv.args.get("limit").unwrap(), 100);
            }
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_timeout_routes_to_fallback() {
        let resolver = IntentResolver::new(
            Catalog::new(),
            Some(Arc::new(FakeBackend::hangs()) as Arc<dyn LanguageBackend>),
            Duration::from_millis(20),
        );
        match resolver.resolve("dashboard summary", &[], &context(), None).await {
            Resolution::Invoke(inv) => assert_eq!(inv.tool, ToolName::GetDashboardStats),
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hallucinated_tool_name_is_not_invoked() {
        let resolver = resolver(Some(FakeBackend::replies(
            r#"{"tool": "delete_everything", "args": {}}"#,
        )));
        match resolver.resolve("do something weird", &[], &context(), None).await {
            Resolution::Unresolved => {}
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nothing_from_either_path_is_unresolved() {
        let resolver = resolver(None);
        assert_eq!(
            resolver.resolve("hello there", &[], &context(), None).await,
            Resolution::Unresolved
        );
    }

    #[test]
    fn system_prompt_mentions_catalogue_and_entity() {
        let ctx = Context::resolve("/candidates/c-42", "org-1", "user-1", Role::Recruiter);
        let prompt = system_prompt(&Catalog::new(), &ctx, Some("Ada Lovelace"));
        assert!(prompt.contains("search_jobs"));
        assert!(prompt.contains("candidate \"Ada Lovelace\""));
        assert!(prompt.contains("Current page: candidates"));
    }
}
