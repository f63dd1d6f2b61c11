//! In-memory reference implementation of [`DataStore`].
//!
//! Matching mirrors the production store's case-insensitive substring search.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::records::*;
use crate::store::*;

#[derive(Default)]
struct Tables {
    candidates: Vec<Candidate>,
    jobs: Vec<Job>,
    clients: Vec<Client>,
    applications: Vec<Application>,
    interviews: Vec<Interview>,
    notes: Vec<Note>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn ilike(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn ilike_str(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_candidate(&self, candidate: Candidate) {
        self.tables.write().await.candidates.push(candidate);
    }

    pub async fn insert_job(&self, job: Job) {
        self.tables.write().await.jobs.push(job);
    }

    pub async fn insert_client(&self, client: Client) {
        self.tables.write().await.clients.push(client);
    }

    pub async fn insert_application(&self, application: Application) {
        self.tables.write().await.applications.push(application);
    }

    pub async fn insert_interview(&self, interview: Interview) {
        self.tables.write().await.interviews.push(interview);
    }

    pub async fn note_count(&self, org_id: &str) -> usize {
        self.tables
            .read()
            .await
            .notes
            .iter()
            .filter(|n| n.organization_id == org_id)
            .count()
    }

    pub async fn notes_for(&self, org_id: &str, entity_id: &str) -> Vec<Note> {
        self.tables
            .read()
            .await
            .notes
            .iter()
            .filter(|n| n.organization_id == org_id && n.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn search_candidates(
        &self,
        org_id: &str,
        filter: CandidateFilter,
    ) -> Result<Vec<Candidate>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .candidates
            .iter()
            .filter(|c| c.organization_id == org_id)
            .filter(|c| {
                filter.query.as_deref().is_none_or(|q| {
                    ilike_str(&c.full_name, q)
                        || ilike(&c.email, q)
                        || ilike(&c.current_title, q)
                })
            })
            .filter(|c| filter.location.as_deref().is_none_or(|l| ilike(&c.location, l)))
            .filter(|c| {
                filter
                    .current_company
                    .as_deref()
                    .is_none_or(|v| ilike(&c.current_company, v))
            })
            .filter(|c| {
                filter
                    .current_title
                    .as_deref()
                    .is_none_or(|v| ilike(&c.current_title, v))
            })
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get_candidate(&self, org_id: &str, id: &str) -> Result<CandidateDetail, StoreError> {
        let tables = self.tables.read().await;
        let candidate = tables
            .candidates
            .iter()
            .find(|c| c.organization_id == org_id && c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "candidate",
                id: id.to_string(),
            })?;
        let notes = tables
            .notes
            .iter()
            .filter(|n| n.organization_id == org_id && n.entity_id == id)
            .cloned()
            .collect();
        Ok(CandidateDetail { candidate, notes })
    }

    async fn create_candidate(
        &self,
        org_id: &str,
        new: NewCandidate,
    ) -> Result<Candidate, StoreError> {
        let candidate = Candidate {
            id: Uuid::new_v4().to_string(),
            organization_id: org_id.to_string(),
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            current_title: new.current_title,
            current_company: new.current_company,
            location: new.location,
            linkedin_url: new.linkedin_url,
            source: new.source,
            created_at: Utc::now(),
        };
        self.tables.write().await.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn update_candidate(
        &self,
        org_id: &str,
        id: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate, StoreError> {
        let mut tables = self.tables.write().await;
        let candidate = tables
            .candidates
            .iter_mut()
            .find(|c| c.organization_id == org_id && c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "candidate",
                id: id.to_string(),
            })?;
        if let Some(v) = patch.full_name {
            candidate.full_name = v;
        }
        if patch.email.is_some() {
            candidate.email = patch.email;
        }
        if patch.phone.is_some() {
            candidate.phone = patch.phone;
        }
        if patch.current_title.is_some() {
            candidate.current_title = patch.current_title;
        }
        if patch.current_company.is_some() {
            candidate.current_company = patch.current_company;
        }
        if patch.location.is_some() {
            candidate.location = patch.location;
        }
        Ok(candidate.clone())
    }

    async fn search_jobs(&self, org_id: &str, filter: JobFilter) -> Result<Vec<Job>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.organization_id == org_id)
            .filter(|j| {
                filter
                    .query
                    .as_deref()
                    .is_none_or(|q| ilike_str(&j.title, q) || ilike(&j.description, q))
            })
            .filter(|j| filter.status.is_none_or(|s| j.status == s))
            .filter(|j| {
                filter
                    .client_id
                    .as_deref()
                    .is_none_or(|c| j.client_id.as_deref() == Some(c))
            })
            .filter(|j| filter.location.as_deref().is_none_or(|l| ilike(&j.location, l)))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get_job(&self, org_id: &str, id: &str) -> Result<JobDetail, StoreError> {
        let tables = self.tables.read().await;
        let job = tables
            .jobs
            .iter()
            .find(|j| j.organization_id == org_id && j.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "job",
                id: id.to_string(),
            })?;
        let client_name = job.client_id.as_deref().and_then(|cid| {
            tables
                .clients
                .iter()
                .find(|c| c.organization_id == org_id && c.id == cid)
                .map(|c| c.name.clone())
        });
        let applications = tables
            .applications
            .iter()
            .filter(|a| a.organization_id == org_id && a.job_id == id)
            .cloned()
            .collect();
        Ok(JobDetail {
            job,
            client_name,
            applications,
        })
    }

    async fn create_job(&self, org_id: &str, new: NewJob) -> Result<Job, StoreError> {
        let job = Job {
            id: Uuid::new_v4().to_string(),
            organization_id: org_id.to_string(),
            title: new.title,
            status: JobStatus::Draft,
            description: new.description,
            location: new.location,
            employment_type: new.employment_type,
            seniority: new.seniority,
            client_id: new.client_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(
        &self,
        org_id: &str,
        id: &str,
        patch: JobPatch,
    ) -> Result<Job, StoreError> {
        let mut tables = self.tables.write().await;
        let job = tables
            .jobs
            .iter_mut()
            .find(|j| j.organization_id == org_id && j.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "job",
                id: id.to_string(),
            })?;
        if let Some(v) = patch.title {
            job.title = v;
        }
        if let Some(v) = patch.status {
            job.status = v;
        }
        if patch.description.is_some() {
            job.description = patch.description;
        }
        Ok(job.clone())
    }

    async fn search_applications(
        &self,
        org_id: &str,
        filter: ApplicationFilter,
    ) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.organization_id == org_id)
            .filter(|a| filter.job_id.as_deref().is_none_or(|v| a.job_id == v))
            .filter(|a| {
                filter
                    .candidate_id
                    .as_deref()
                    .is_none_or(|v| a.candidate_id == v)
            })
            .filter(|a| filter.stage.as_deref().is_none_or(|v| a.stage == v))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn update_application_stage(
        &self,
        org_id: &str,
        id: &str,
        stage: &str,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables.write().await;
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.organization_id == org_id && a.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "application",
                id: id.to_string(),
            })?;
        application.stage = stage.to_string();
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn schedule_interview(
        &self,
        org_id: &str,
        new: NewInterview,
    ) -> Result<Interview, StoreError> {
        let mut tables = self.tables.write().await;
        // The application must exist inside the same organization.
        if !tables
            .applications
            .iter()
            .any(|a| a.organization_id == org_id && a.id == new.application_id)
        {
            return Err(StoreError::NotFound {
                kind: "application",
                id: new.application_id,
            });
        }
        let interview = Interview {
            id: Uuid::new_v4().to_string(),
            organization_id: org_id.to_string(),
            application_id: new.application_id,
            scheduled_at: new.scheduled_at,
            status: InterviewStatus::Scheduled,
            notes: new.notes,
        };
        tables.interviews.push(interview.clone());
        Ok(interview)
    }

    async fn upcoming_interviews(
        &self,
        org_id: &str,
        window: InterviewWindow,
    ) -> Result<Vec<InterviewSlot>, StoreError> {
        let tables = self.tables.read().await;
        let now = Utc::now();
        let horizon = now + Duration::days(window.days_ahead);
        let mut slots: Vec<InterviewSlot> = tables
            .interviews
            .iter()
            .filter(|i| i.organization_id == org_id)
            .filter(|i| i.scheduled_at >= now && i.scheduled_at <= horizon)
            .map(|i| {
                let application = tables
                    .applications
                    .iter()
                    .find(|a| a.organization_id == org_id && a.id == i.application_id);
                let candidate_name = application
                    .and_then(|a| {
                        tables
                            .candidates
                            .iter()
                            .find(|c| c.organization_id == org_id && c.id == a.candidate_id)
                    })
                    .map(|c| c.full_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                let job_title = application
                    .and_then(|a| {
                        tables
                            .jobs
                            .iter()
                            .find(|j| j.organization_id == org_id && j.id == a.job_id)
                    })
                    .map(|j| j.title.clone())
                    .unwrap_or_else(|| "Unknown position".to_string());
                InterviewSlot {
                    interview: i.clone(),
                    candidate_name,
                    job_title,
                }
            })
            .collect();
        slots.sort_by_key(|s| s.interview.scheduled_at);
        slots.truncate(window.limit);
        Ok(slots)
    }

    async fn search_clients(
        &self,
        org_id: &str,
        filter: ClientFilter,
    ) -> Result<Vec<Client>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .iter()
            .filter(|c| c.organization_id == org_id)
            .filter(|c| {
                filter
                    .query
                    .as_deref()
                    .is_none_or(|q| ilike_str(&c.name, q) || ilike(&c.contact_person, q))
            })
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get_client(&self, org_id: &str, id: &str) -> Result<Client, StoreError> {
        self.tables
            .read()
            .await
            .clients
            .iter()
            .find(|c| c.organization_id == org_id && c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "client",
                id: id.to_string(),
            })
    }

    async fn add_note(
        &self,
        org_id: &str,
        author_id: &str,
        new: NewNote,
    ) -> Result<Note, StoreError> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            organization_id: org_id.to_string(),
            entity_type: new.entity_type,
            entity_id: new.entity_id,
            content: new.content,
            author_id: author_id.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.notes.push(note.clone());
        Ok(note)
    }

    async fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats, StoreError> {
        let tables = self.tables.read().await;
        let now = Utc::now();
        Ok(DashboardStats {
            total_candidates: tables
                .candidates
                .iter()
                .filter(|c| c.organization_id == org_id)
                .count() as u64,
            total_jobs: tables
                .jobs
                .iter()
                .filter(|j| j.organization_id == org_id)
                .count() as u64,
            active_jobs: tables
                .jobs
                .iter()
                .filter(|j| j.organization_id == org_id && j.status == JobStatus::Active)
                .count() as u64,
            pending_applications: tables
                .applications
                .iter()
                .filter(|a| a.organization_id == org_id && a.status == ApplicationStatus::Active)
                .count() as u64,
            upcoming_interviews: tables
                .interviews
                .iter()
                .filter(|i| i.organization_id == org_id && i.scheduled_at >= now)
                .count() as u64,
        })
    }

    async fn entity_name(&self, org_id: &str, kind: EntityKind, id: &str) -> Option<String> {
        let tables = self.tables.read().await;
        match kind {
            EntityKind::Candidate => tables
                .candidates
                .iter()
                .find(|c| c.organization_id == org_id && c.id == id)
                .map(|c| c.full_name.clone()),
            EntityKind::Job => tables
                .jobs
                .iter()
                .find(|j| j.organization_id == org_id && j.id == id)
                .map(|j| j.title.clone()),
            EntityKind::Client => tables
                .clients
                .iter()
                .find(|c| c.organization_id == org_id && c.id == id)
                .map(|c| c.name.clone()),
            EntityKind::Application | EntityKind::Interview => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(org: &str, name: &str, location: Option<&str>) -> Candidate {
        Candidate {
            id: Uuid::new_v4().to_string(),
            organization_id: org.to_string(),
            full_name: name.to_string(),
            email: None,
            phone: None,
            current_title: None,
            current_company: None,
            location: location.map(str::to_string),
            linkedin_url: None,
            source: None,
            created_at: Utc::now(),
        }
    }

    fn job(org: &str, title: &str, status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4().to_string(),
            organization_id: org.to_string(),
            title: title.to_string(),
            status,
            description: None,
            location: None,
            employment_type: None,
            seniority: None,
            client_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn searches_never_cross_organizations() {
        let store = MemoryStore::new();
        store.insert_candidate(candidate("org-a", "Ada Lovelace", None)).await;
        store.insert_candidate(candidate("org-b", "Grace Hopper", None)).await;

        let hits = store
            .search_candidates("org-a", CandidateFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn job_search_filters_status_and_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .insert_job(job("org-a", &format!("Engineer {i}"), JobStatus::Active))
                .await;
        }
        store.insert_job(job("org-a", "Archivist", JobStatus::Closed)).await;

        let active = store
            .search_jobs(
                "org-a",
                JobFilter {
                    status: Some(JobStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 10); // default limit
        assert!(active.iter().all(|j| j.status == JobStatus::Active));
    }

    #[tokio::test]
    async fn get_candidate_refuses_other_tenant_ids() {
        let store = MemoryStore::new();
        let c = candidate("org-a", "Ada Lovelace", None);
        let id = c.id.clone();
        store.insert_candidate(c).await;

        assert!(store.get_candidate("org-b", &id).await.is_err());
        assert!(store.get_candidate("org-a", &id).await.is_ok());
    }

    #[tokio::test]
    async fn dashboard_stats_counts_are_scoped_and_zero_when_empty() {
        let store = MemoryStore::new();
        store.insert_job(job("org-a", "Engineer", JobStatus::Active)).await;

        let stats = store.dashboard_stats("org-b").await.unwrap();
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.active_jobs, 0);

        let stats = store.dashboard_stats("org-a").await.unwrap();
        assert_eq!(stats.total_jobs, 1);
        assert_eq!(stats.active_jobs, 1);
    }

    #[tokio::test]
    async fn schedule_interview_requires_application_in_same_org() {
        let store = MemoryStore::new();
        let app = Application {
            id: "app-1".to_string(),
            organization_id: "org-a".to_string(),
            candidate_id: "c-1".to_string(),
            job_id: "j-1".to_string(),
            stage: "screening".to_string(),
            status: ApplicationStatus::Active,
            applied_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.insert_application(app).await;

        let new = |app_id: &str| NewInterview {
            application_id: app_id.to_string(),
            scheduled_at: Utc::now() + Duration::days(1),
            notes: None,
        };
        assert!(store.schedule_interview("org-b", new("app-1")).await.is_err());
        assert!(store.schedule_interview("org-a", new("app-1")).await.is_ok());
    }
}
