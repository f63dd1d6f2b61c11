//! The seam between the orchestrator and the relational store.
//!
//! Every method takes the owning organization id explicitly; there is no
//! ambient tenant state anywhere in the crate. Filter and payload structs
//! deserialize directly from tool arguments, so their field names are part of
//! the tool parameter schemas.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::{
    Application, ApplicationStatus, Candidate, Client, ClientStatus, DashboardStats, EntityKind,
    Interview, InterviewSlot, Job, JobStatus, Note,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("backing store error: {0}")]
    Backend(String),
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateFilter {
    pub query: Option<String>,
    pub skills: Option<String>,
    pub location: Option<String>,
    pub current_company: Option<String>,
    pub current_title: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            query: None,
            skills: None,
            location: None,
            current_company: None,
            current_title: None,
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobFilter {
    pub query: Option<String>,
    pub status: Option<JobStatus>,
    pub client_id: Option<String>,
    pub location: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            query: None,
            status: None,
            client_id: None,
            location: None,
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationFilter {
    pub job_id: Option<String>,
    pub candidate_id: Option<String>,
    pub stage: Option<String>,
    pub status: Option<ApplicationStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ApplicationFilter {
    fn default() -> Self {
        Self {
            job_id: None,
            candidate_id: None,
            stage: None,
            status: None,
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientFilter {
    pub query: Option<String>,
    pub status: Option<ClientStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ClientFilter {
    fn default() -> Self {
        Self {
            query: None,
            status: None,
            limit: default_limit(),
        }
    }
}

fn default_days_ahead() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewWindow {
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for InterviewWindow {
    fn default() -> Self {
        Self {
            days_ahead: default_days_ahead(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub seniority: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub status: Option<JobStatus>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNote {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInterview {
    pub application_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A candidate joined with their notes, for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub notes: Vec<Note>,
}

/// A job joined with its applications, for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub client_name: Option<String>,
    pub applications: Vec<Application>,
}

/// The relational store behind the orchestrator. Production wires this to the
/// platform's database; tests and the demo server use [`crate::MemoryStore`].
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn search_candidates(
        &self,
        org_id: &str,
        filter: CandidateFilter,
    ) -> Result<Vec<Candidate>, StoreError>;

    async fn get_candidate(&self, org_id: &str, id: &str) -> Result<CandidateDetail, StoreError>;

    async fn create_candidate(
        &self,
        org_id: &str,
        new: NewCandidate,
    ) -> Result<Candidate, StoreError>;

    async fn update_candidate(
        &self,
        org_id: &str,
        id: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate, StoreError>;

    async fn search_jobs(&self, org_id: &str, filter: JobFilter) -> Result<Vec<Job>, StoreError>;

    async fn get_job(&self, org_id: &str, id: &str) -> Result<JobDetail, StoreError>;

    async fn create_job(&self, org_id: &str, new: NewJob) -> Result<Job, StoreError>;

    async fn update_job(&self, org_id: &str, id: &str, patch: JobPatch)
        -> Result<Job, StoreError>;

    async fn search_applications(
        &self,
        org_id: &str,
        filter: ApplicationFilter,
    ) -> Result<Vec<Application>, StoreError>;

    async fn update_application_stage(
        &self,
        org_id: &str,
        id: &str,
        stage: &str,
    ) -> Result<Application, StoreError>;

    async fn schedule_interview(
        &self,
        org_id: &str,
        new: NewInterview,
    ) -> Result<Interview, StoreError>;

    async fn upcoming_interviews(
        &self,
        org_id: &str,
        window: InterviewWindow,
    ) -> Result<Vec<InterviewSlot>, StoreError>;

    async fn search_clients(
        &self,
        org_id: &str,
        filter: ClientFilter,
    ) -> Result<Vec<Client>, StoreError>;

    async fn get_client(&self, org_id: &str, id: &str) -> Result<Client, StoreError>;

    async fn add_note(&self, org_id: &str, author_id: &str, new: NewNote)
        -> Result<Note, StoreError>;

    async fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats, StoreError>;

    /// Display name of a record, used to enrich the intent-resolution prompt
    /// when the caller is viewing a specific entity. Absence is not an error.
    async fn entity_name(&self, org_id: &str, kind: EntityKind, id: &str) -> Option<String>;
}
