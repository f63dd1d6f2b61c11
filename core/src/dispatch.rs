//! Tool dispatch: a tagged match from [`ToolName`] to its typed handler.
//!
//! The dispatcher runs read tools directly and confirmed mutating actions on
//! behalf of the confirmation gate; it never decides *whether* a mutating
//! tool may run, only *how*. Every handler gets the caller's scope explicitly
//! and the store filters on it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::catalog::{Catalog, ToolName};
use crate::error::CopilotError;
use copilot_tools::{
    ApplicationFilter, CandidateFilter, CandidatePatch, ClientFilter, DataStore, InterviewWindow,
    JobFilter, JobPatch, NewCandidate, NewInterview, NewJob, NewNote, StoreError,
};

/// Explicit per-request tenant scope. Handlers receive this as a parameter;
/// there is no ambient organization or caller state anywhere.
#[derive(Debug, Clone)]
pub struct OrgScope {
    pub organization_id: String,
    pub caller_id: String,
}

pub struct Dispatcher {
    catalog: Catalog,
    store: Arc<dyn DataStore>,
}

impl Dispatcher {
    pub fn new(catalog: Catalog, store: Arc<dyn DataStore>) -> Self {
        Self { catalog, store }
    }

    /// Validates required arguments against the tool's definition, then runs
    /// the handler. Store failures come back as `Err(CopilotError::Store)`;
    /// the caller renders them as a conversational error message.
    pub async fn execute(
        &self,
        tool: ToolName,
        args: &Map<String, Value>,
        scope: &OrgScope,
    ) -> Result<Value, CopilotError> {
        let def = self.catalog.get(tool);
        for name in def.required {
            match args.get(*name) {
                None | Some(Value::Null) => {
                    return Err(CopilotError::MissingArgument { tool, name });
                }
                Some(_) => {}
            }
        }

        info!(%tool, org = %scope.organization_id, "dispatching tool");
        let result = self.run(tool, args, scope).await;
        if let Err(e) = &result {
            error!(%tool, error = %e, "tool execution failed");
        }
        result
    }

    async fn run(
        &self,
        tool: ToolName,
        args: &Map<String, Value>,
        scope: &OrgScope,
    ) -> Result<Value, CopilotError> {
        let org = scope.organization_id.as_str();
        match tool {
            ToolName::SearchCandidates => {
                let filter: CandidateFilter = from_args(tool, args)?;
                let candidates = self.store.search_candidates(org, filter).await?;
                Ok(json!({ "count": candidates.len(), "candidates": candidates }))
            }
            ToolName::GetCandidate => {
                let id = str_arg(tool, args, "candidate_id")?;
                let detail = self.store.get_candidate(org, id).await?;
                to_json(detail)
            }
            ToolName::CreateCandidate => {
                let new: NewCandidate = from_args(tool, args)?;
                let candidate = self.store.create_candidate(org, new).await?;
                Ok(json!({ "success": true, "candidate": candidate }))
            }
            ToolName::UpdateCandidate => {
                let id = str_arg(tool, args, "candidate_id")?.to_string();
                let patch: CandidatePatch = from_args(tool, args)?;
                let candidate = self.store.update_candidate(org, &id, patch).await?;
                Ok(json!({ "success": true, "candidate": candidate }))
            }
            ToolName::SearchJobs => {
                let filter: JobFilter = from_args(tool, args)?;
                let jobs = self.store.search_jobs(org, filter).await?;
                Ok(json!({ "count": jobs.len(), "jobs": jobs }))
            }
            ToolName::GetJob => {
                let id = str_arg(tool, args, "job_id")?;
                let detail = self.store.get_job(org, id).await?;
                to_json(detail)
            }
            ToolName::CreateJob => {
                let new: NewJob = from_args(tool, args)?;
                let job = self.store.create_job(org, new).await?;
                Ok(json!({ "success": true, "job": job }))
            }
            ToolName::UpdateJob => {
                let id = str_arg(tool, args, "job_id")?.to_string();
                let patch: JobPatch = from_args(tool, args)?;
                let job = self.store.update_job(org, &id, patch).await?;
                Ok(json!({ "success": true, "job": job }))
            }
            ToolName::SearchApplications => {
                let filter: ApplicationFilter = from_args(tool, args)?;
                let applications = self.store.search_applications(org, filter).await?;
                Ok(json!({ "count": applications.len(), "applications": applications }))
            }
            ToolName::UpdateApplicationStage => {
                let id = str_arg(tool, args, "application_id")?;
                let stage = str_arg(tool, args, "stage")?;
                let application = self.store.update_application_stage(org, id, stage).await?;
                Ok(json!({ "success": true, "application": application }))
            }
            ToolName::ScheduleInterview => {
                let application_id = str_arg(tool, args, "application_id")?.to_string();
                let scheduled_at = datetime_arg(tool, args, "scheduled_at")?;
                let notes = args
                    .get("notes")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let interview = self
                    .store
                    .schedule_interview(
                        org,
                        NewInterview {
                            application_id,
                            scheduled_at,
                            notes,
                        },
                    )
                    .await?;
                Ok(json!({ "success": true, "interview": interview }))
            }
            ToolName::GetUpcomingInterviews => {
                let window: InterviewWindow = from_args(tool, args)?;
                let interviews = self.store.upcoming_interviews(org, window).await?;
                Ok(json!({ "interviews": interviews }))
            }
            ToolName::SearchClients => {
                let filter: ClientFilter = from_args(tool, args)?;
                let clients = self.store.search_clients(org, filter).await?;
                Ok(json!({ "count": clients.len(), "clients": clients }))
            }
            ToolName::GetClient => {
                let id = str_arg(tool, args, "client_id")?;
                let client = self.store.get_client(org, id).await?;
                to_json(client)
            }
            ToolName::AddNote => {
                let new: NewNote = from_args(tool, args)?;
                let note = self.store.add_note(org, &scope.caller_id, new).await?;
                Ok(json!({ "success": true, "note": note }))
            }
            ToolName::GetDashboardStats => {
                let stats = self.store.dashboard_stats(org).await?;
                to_json(stats)
            }
        }
    }
}

fn from_args<T: DeserializeOwned>(
    tool: ToolName,
    args: &Map<String, Value>,
) -> Result<T, CopilotError> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|e| CopilotError::InvalidArgument {
        tool,
        name: "args",
        message: e.to_string(),
    })
}

fn str_arg<'a>(
    tool: ToolName,
    args: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, CopilotError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or(CopilotError::MissingArgument { tool, name })
}

fn datetime_arg(
    tool: ToolName,
    args: &Map<String, Value>,
    name: &'static str,
) -> Result<DateTime<Utc>, CopilotError> {
    let raw = str_arg(tool, args, name)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| CopilotError::InvalidArgument {
            tool,
            name,
            message: e.to_string(),
        })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, CopilotError> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend(e.to_string()).into())
}
