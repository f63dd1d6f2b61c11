//! The tool catalogue: the single source of truth for what the orchestrator
//! can ever do.
//!
//! Tools are a closed enum rather than free strings, so dispatch is checked at
//! compile time; strings only appear at the LLM boundary and are parsed
//! through [`ToolName::parse`]. The catalogue itself is immutable after
//! startup.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Recruiter,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "recruiter" => Some(Role::Recruiter),
            "client" => Some(Role::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchCandidates,
    GetCandidate,
    CreateCandidate,
    UpdateCandidate,
    SearchJobs,
    GetJob,
    CreateJob,
    UpdateJob,
    SearchApplications,
    UpdateApplicationStage,
    ScheduleInterview,
    GetUpcomingInterviews,
    SearchClients,
    GetClient,
    AddNote,
    GetDashboardStats,
}

impl ToolName {
    pub const ALL: [ToolName; 16] = [
        ToolName::SearchCandidates,
        ToolName::GetCandidate,
        ToolName::CreateCandidate,
        ToolName::UpdateCandidate,
        ToolName::SearchJobs,
        ToolName::GetJob,
        ToolName::CreateJob,
        ToolName::UpdateJob,
        ToolName::SearchApplications,
        ToolName::UpdateApplicationStage,
        ToolName::ScheduleInterview,
        ToolName::GetUpcomingInterviews,
        ToolName::SearchClients,
        ToolName::GetClient,
        ToolName::AddNote,
        ToolName::GetDashboardStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchCandidates => "search_candidates",
            ToolName::GetCandidate => "get_candidate",
            ToolName::CreateCandidate => "create_candidate",
            ToolName::UpdateCandidate => "update_candidate",
            ToolName::SearchJobs => "search_jobs",
            ToolName::GetJob => "get_job",
            ToolName::CreateJob => "create_job",
            ToolName::UpdateJob => "update_job",
            ToolName::SearchApplications => "search_applications",
            ToolName::UpdateApplicationStage => "update_application_stage",
            ToolName::ScheduleInterview => "schedule_interview",
            ToolName::GetUpcomingInterviews => "get_upcoming_interviews",
            ToolName::SearchClients => "search_clients",
            ToolName::GetClient => "get_client",
            ToolName::AddNote => "add_note",
            ToolName::GetDashboardStats => "get_dashboard_stats",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

/// One named parameter in a tool's schema.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// Allowed values, empty when unconstrained.
    pub values: &'static [&'static str],
}

impl ParamSpec {
    const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            description,
            values: &[],
        }
    }

    const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            description,
            values: &[],
        }
    }

    const fn choice(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            description,
            values,
        }
    }
}

/// Immutable description of one catalogue operation.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub required: &'static [&'static str],
    /// Roles allowed to use the tool; empty means every role.
    pub allow: &'static [Role],
    /// Mutating tools are gated behind explicit confirmation.
    pub mutating: bool,
}

impl ToolDefinition {
    pub fn allows(&self, role: Role) -> bool {
        self.allow.is_empty() || self.allow.contains(&role)
    }
}

const RECRUITERS: &[Role] = &[Role::Admin, Role::Recruiter];

const JOB_STATUSES: &[&str] = &["draft", "active", "paused", "closed", "filled"];
const APPLICATION_STATUSES: &[&str] = &["active", "rejected", "hired", "withdrawn"];
const CLIENT_STATUSES: &[&str] = &["active", "inactive"];
const NOTE_TARGETS: &[&str] = &["candidate", "job", "client"];

const DEFINITIONS: &[ToolDefinition] = &[
    ToolDefinition {
        name: ToolName::SearchCandidates,
        description: "Search for candidates in the organization. Use this when the user wants \
                      to find, list, or filter candidates by name, skills, location, or other \
                      criteria.",
        params: &[
            ParamSpec::string("query", "Search query (name, email, or keywords)"),
            ParamSpec::string("skills", "Comma-separated list of required skills"),
            ParamSpec::string("location", "Location filter (city, state, or country)"),
            ParamSpec::string("current_company", "Filter by current company"),
            ParamSpec::number("limit", "Maximum number of results to return (default: 10)"),
        ],
        required: &[],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::GetCandidate,
        description: "Get detailed information about a specific candidate by ID. Use this when \
                      the user asks about a particular candidate's profile, experience, or \
                      applications.",
        params: &[ParamSpec::string(
            "candidate_id",
            "The unique identifier of the candidate",
        )],
        required: &["candidate_id"],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::CreateCandidate,
        description: "Create a new candidate record. Use this when the user wants to add a new \
                      candidate to the system.",
        params: &[
            ParamSpec::string("full_name", "Full name of the candidate"),
            ParamSpec::string("email", "Email address"),
            ParamSpec::string("phone", "Phone number"),
            ParamSpec::string("current_title", "Current job title"),
            ParamSpec::string("current_company", "Current employer"),
            ParamSpec::string("location", "Location (city, state/country)"),
            ParamSpec::string("linkedin_url", "LinkedIn profile URL"),
            ParamSpec::string("source", "Source of the candidate (e.g., LinkedIn, Referral)"),
        ],
        required: &["full_name"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::UpdateCandidate,
        description: "Update an existing candidate's information. Use this when the user wants \
                      to modify candidate details.",
        params: &[
            ParamSpec::string("candidate_id", "The unique identifier of the candidate"),
            ParamSpec::string("full_name", "Full name of the candidate"),
            ParamSpec::string("email", "Email address"),
            ParamSpec::string("phone", "Phone number"),
            ParamSpec::string("current_title", "Current job title"),
            ParamSpec::string("current_company", "Current employer"),
            ParamSpec::string("location", "Location (city, state/country)"),
        ],
        required: &["candidate_id"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::SearchJobs,
        description: "Search for jobs in the organization. Use this when the user wants to \
                      find, list, or filter jobs by title, status, client, or other criteria.",
        params: &[
            ParamSpec::string("query", "Search query (job title or keywords)"),
            ParamSpec::choice("status", "Filter by job status", JOB_STATUSES),
            ParamSpec::string("client_id", "Filter by client ID"),
            ParamSpec::string("location", "Filter by location"),
            ParamSpec::number("limit", "Maximum number of results to return (default: 10)"),
        ],
        required: &[],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::GetJob,
        description: "Get detailed information about a specific job by ID. Use this when the \
                      user asks about a particular job's details, requirements, or applicants.",
        params: &[ParamSpec::string("job_id", "The unique identifier of the job")],
        required: &["job_id"],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::CreateJob,
        description: "Create a new job posting. Use this when the user wants to add a new job \
                      to the system.",
        params: &[
            ParamSpec::string("title", "Job title"),
            ParamSpec::string("description", "Full job description"),
            ParamSpec::string("client_id", "Client ID for the job"),
            ParamSpec::string("location", "Job location"),
            ParamSpec::string("employment_type", "Type of employment (e.g., Full-time, Contract)"),
            ParamSpec::string("seniority", "Seniority level (e.g., Senior, Mid-level)"),
        ],
        required: &["title"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::UpdateJob,
        description: "Update an existing job posting. Use this when the user wants to modify \
                      job details or status.",
        params: &[
            ParamSpec::string("job_id", "The unique identifier of the job"),
            ParamSpec::string("title", "Job title"),
            ParamSpec::choice("status", "Job status", JOB_STATUSES),
            ParamSpec::string("description", "Full job description"),
        ],
        required: &["job_id"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::SearchApplications,
        description: "Search for applications. Use this when the user wants to see candidates \
                      applied to jobs or track application status.",
        params: &[
            ParamSpec::string("job_id", "Filter by job ID"),
            ParamSpec::string("candidate_id", "Filter by candidate ID"),
            ParamSpec::string("stage", "Filter by pipeline stage"),
            ParamSpec::choice("status", "Filter by application status", APPLICATION_STATUSES),
            ParamSpec::number("limit", "Maximum number of results to return (default: 10)"),
        ],
        required: &[],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::UpdateApplicationStage,
        description: "Move an application to a different pipeline stage. Use this when the user \
                      wants to advance or change an applicant's status.",
        params: &[
            ParamSpec::string("application_id", "The unique identifier of the application"),
            ParamSpec::string("stage", "The new pipeline stage"),
            ParamSpec::string("notes", "Optional notes about the stage change"),
        ],
        required: &["application_id", "stage"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::ScheduleInterview,
        description: "Schedule an interview for an application. Use this when the user wants to \
                      set up an interview with a candidate.",
        params: &[
            ParamSpec::string("application_id", "The application ID to schedule interview for"),
            ParamSpec::string("scheduled_at", "ISO datetime string for the interview time"),
            ParamSpec::string("notes", "Optional notes about the interview"),
        ],
        required: &["application_id", "scheduled_at"],
        allow: RECRUITERS,
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::GetUpcomingInterviews,
        description: "Get list of upcoming interviews. Use this when the user wants to see \
                      their interview schedule.",
        params: &[
            ParamSpec::number("days_ahead", "Number of days to look ahead (default: 7)"),
            ParamSpec::number("limit", "Maximum number of results to return (default: 10)"),
        ],
        required: &[],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::SearchClients,
        description: "Search for clients in the organization. Use this when the user wants to \
                      find or list clients.",
        params: &[
            ParamSpec::string("query", "Search query (client name or contact)"),
            ParamSpec::choice("status", "Filter by client status", CLIENT_STATUSES),
            ParamSpec::number("limit", "Maximum number of results to return (default: 10)"),
        ],
        required: &[],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::GetClient,
        description: "Get detailed information about a specific client by ID.",
        params: &[ParamSpec::string("client_id", "The unique identifier of the client")],
        required: &["client_id"],
        allow: &[],
        mutating: false,
    },
    ToolDefinition {
        name: ToolName::AddNote,
        description: "Add a note to an entity (candidate, job, client). Use this when the user \
                      wants to record information or feedback.",
        params: &[
            ParamSpec::choice("entity_type", "Type of entity to add note to", NOTE_TARGETS),
            ParamSpec::string("entity_id", "The unique identifier of the entity"),
            ParamSpec::string("content", "The note content"),
        ],
        required: &["entity_type", "entity_id", "content"],
        allow: &[],
        mutating: true,
    },
    ToolDefinition {
        name: ToolName::GetDashboardStats,
        description: "Get summary statistics for the dashboard. Use this when the user asks for \
                      metrics, summaries, or overviews.",
        params: &[ParamSpec {
            name: "include_breakdown",
            kind: ParamKind::Boolean,
            description: "Include breakdown by status or stage",
            values: &[],
        }],
        required: &[],
        allow: &[],
        mutating: false,
    },
];

/// Static registry of every operation the orchestrator can perform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    pub fn new() -> Self {
        Catalog
    }

    /// Looks a definition up by its enum identifier. Total: every variant has
    /// exactly one definition (checked by test).
    pub fn get(&self, name: ToolName) -> &'static ToolDefinition {
        &DEFINITIONS[name as usize]
    }

    /// Looks a definition up by wire name. Unknown names are `None`; callers
    /// must treat that as a hard error, never a no-op.
    pub fn by_name(&self, name: &str) -> Option<&'static ToolDefinition> {
        ToolName::parse(name).map(|t| self.get(t))
    }

    /// Definitions available to the given role.
    pub fn for_role(&self, role: Role) -> Vec<&'static ToolDefinition> {
        DEFINITIONS.iter().filter(|d| d.allows(role)).collect()
    }

    pub fn all(&self) -> &'static [ToolDefinition] {
        DEFINITIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_are_indexed_by_variant() {
        assert_eq!(DEFINITIONS.len(), ToolName::ALL.len());
        for name in ToolName::ALL {
            assert_eq!(Catalog.get(name).name, name);
        }
    }

    #[test]
    fn wire_names_round_trip() {
        for name in ToolName::ALL {
            assert_eq!(ToolName::parse(name.as_str()), Some(name));
        }
        assert_eq!(ToolName::parse("drop_all_tables"), None);
        assert!(Catalog.by_name("drop_all_tables").is_none());
    }

    #[test]
    fn allow_lists_gate_exactly_their_roles() {
        let catalog = Catalog::new();
        for def in catalog.all() {
            if def.allow.is_empty() {
                for role in [Role::Admin, Role::Recruiter, Role::Client] {
                    assert!(def.allows(role), "{} should allow {}", def.name, role);
                }
            } else {
                for role in [Role::Admin, Role::Recruiter, Role::Client] {
                    assert_eq!(def.allows(role), def.allow.contains(&role));
                }
            }
        }
        assert!(!catalog.get(ToolName::CreateCandidate).allows(Role::Client));
        assert!(catalog.get(ToolName::SearchJobs).allows(Role::Client));
    }

    #[test]
    fn role_visibility_filters_catalogue() {
        let catalog = Catalog::new();
        let client_tools = catalog.for_role(Role::Client);
        assert!(client_tools
            .iter()
            .all(|d| d.allow.is_empty() || d.allow.contains(&Role::Client)));
        assert!(catalog.for_role(Role::Admin).len() > client_tools.len());
    }

    #[test]
    fn every_required_parameter_is_declared() {
        for def in Catalog.all() {
            for req in def.required {
                assert!(
                    def.params.iter().any(|p| p.name == *req),
                    "{} requires undeclared parameter {}",
                    def.name,
                    req
                );
            }
        }
    }

    #[test]
    fn mutating_tools_match_the_write_operations() {
        let mutating: Vec<_> = Catalog
            .all()
            .iter()
            .filter(|d| d.mutating)
            .map(|d| d.name)
            .collect();
        assert_eq!(
            mutating,
            vec![
                ToolName::CreateCandidate,
                ToolName::UpdateCandidate,
                ToolName::CreateJob,
                ToolName::UpdateJob,
                ToolName::UpdateApplicationStage,
                ToolName::ScheduleInterview,
                ToolName::AddNote,
            ]
        );
    }
}
