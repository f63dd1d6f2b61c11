//! Record types shared between the data layer and the orchestrator.
//!
//! Every record carries its owning `organization_id`; the store filters on it
//! for every query, and nothing above the store is allowed to widen that scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Active,
    Paused,
    Closed,
    Filled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Active,
    Rejected,
    Hired,
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// Entity kinds a note (or a navigation context) can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Candidate,
    Job,
    Client,
    Application,
    Interview,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Candidate => "candidate",
            EntityKind::Job => "job",
            EntityKind::Client => "client",
            EntityKind::Application => "application",
            EntityKind::Interview => "interview",
        }
    }

    /// Maps a plural path segment ("candidates", "jobs", ...) to its kind.
    pub fn from_collection(segment: &str) -> Option<Self> {
        match segment {
            "candidates" => Some(EntityKind::Candidate),
            "jobs" => Some(EntityKind::Job),
            "clients" => Some(EntityKind::Client),
            "applications" => Some(EntityKind::Application),
            "interviews" => Some(EntityKind::Interview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub organization_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub status: JobStatus,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub seniority: Option<String>,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub status: ClientStatus,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub organization_id: String,
    pub candidate_id: String,
    pub job_id: String,
    pub stage: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub organization_id: String,
    pub application_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: InterviewStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub organization_id: String,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts for the dashboard summary. Zero counts are real zeros,
/// never omitted fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_candidates: u64,
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub pending_applications: u64,
    pub upcoming_interviews: u64,
}

/// An interview joined with the candidate and job it belongs to, as the
/// schedule view wants it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSlot {
    pub interview: Interview,
    pub candidate_name: String,
    pub job_title: String,
}
