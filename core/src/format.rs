//! Renders raw tool payloads into the assistant's reply text.
//!
//! Pure functions keyed on the tool. Empty result sets get an explicit
//! empty-state sentence; errors are rendered separately and never look like
//! an empty list.

use serde_json::{Map, Value};

use crate::catalog::ToolName;

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn field_or<'a>(value: &'a Value, name: &str, fallback: &'a str) -> &'a str {
    match value.get(name).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s,
        _ => fallback,
    }
}

fn count(value: &Value, name: &str) -> u64 {
    value.get(name).and_then(Value::as_u64).unwrap_or(0)
}

/// Human-readable summary of a successful tool result.
pub fn format_result(tool: ToolName, payload: &Value) -> String {
    // Handler payloads that carry an error field render as errors even if the
    // call itself did not fault.
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        return format_error(tool, message);
    }

    match tool {
        ToolName::SearchJobs => match payload.get("jobs").and_then(Value::as_array) {
            Some(jobs) if jobs.is_empty() => {
                "No jobs found matching your criteria.".to_string()
            }
            Some(jobs) => {
                let lines: Vec<String> = jobs
                    .iter()
                    .enumerate()
                    .map(|(i, j)| {
                        let seniority = field(j, "seniority");
                        let suffix = if seniority.is_empty() {
                            String::new()
                        } else {
                            format!(" | {seniority}")
                        };
                        format!(
                            "{}. **{}**\n   Status: {}\n   Location: {}{}",
                            i + 1,
                            field_or(j, "title", "Untitled"),
                            field_or(j, "status", "Unknown"),
                            field_or(j, "location", "Not specified"),
                            suffix
                        )
                    })
                    .collect();
                format!("Found **{}** job(s):\n\n{}", jobs.len(), lines.join("\n\n"))
            }
            None => fallback(payload),
        },
        ToolName::SearchCandidates => {
            match payload.get("candidates").and_then(Value::as_array) {
                Some(candidates) if candidates.is_empty() => {
                    "No candidates found matching your criteria.".to_string()
                }
                Some(candidates) => {
                    let lines: Vec<String> = candidates
                        .iter()
                        .enumerate()
                        .map(|(i, c)| {
                            format!(
                                "{}. **{}**\n   {} at {}\n   Location: {}",
                                i + 1,
                                field_or(c, "full_name", "Unknown"),
                                field_or(c, "current_title", "No title"),
                                field_or(c, "current_company", "Unknown"),
                                field_or(c, "location", "Not specified")
                            )
                        })
                        .collect();
                    format!(
                        "Found **{}** candidate(s):\n\n{}",
                        candidates.len(),
                        lines.join("\n\n")
                    )
                }
                None => fallback(payload),
            }
        }
        ToolName::SearchClients => match payload.get("clients").and_then(Value::as_array) {
            Some(clients) if clients.is_empty() => "No clients found.".to_string(),
            Some(clients) => {
                let lines: Vec<String> = clients
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        format!(
                            "{}. **{}**\n   Contact: {}\n   Status: {}",
                            i + 1,
                            field_or(c, "name", "Unknown"),
                            field_or(c, "contact_person", "N/A"),
                            field_or(c, "status", "Unknown")
                        )
                    })
                    .collect();
                format!(
                    "Found **{}** client(s):\n\n{}",
                    clients.len(),
                    lines.join("\n\n")
                )
            }
            None => fallback(payload),
        },
        ToolName::SearchApplications => {
            match payload.get("applications").and_then(Value::as_array) {
                Some(applications) if applications.is_empty() => {
                    "No applications found.".to_string()
                }
                Some(applications) => {
                    format!("Found **{}** application(s).", applications.len())
                }
                None => fallback(payload),
            }
        }
        ToolName::GetUpcomingInterviews => {
            match payload.get("interviews").and_then(Value::as_array) {
                Some(interviews) if interviews.is_empty() => {
                    "No upcoming interviews scheduled.".to_string()
                }
                Some(interviews) => {
                    let lines: Vec<String> = interviews
                        .iter()
                        .enumerate()
                        .map(|(i, slot)| {
                            let time = slot
                                .pointer("/interview/scheduled_at")
                                .and_then(Value::as_str)
                                .unwrap_or("TBD");
                            format!(
                                "{}. **{}** - {}\n   Scheduled: {}",
                                i + 1,
                                field_or(slot, "candidate_name", "Unknown"),
                                field_or(slot, "job_title", "Unknown position"),
                                time
                            )
                        })
                        .collect();
                    format!(
                        "**Upcoming Interviews:** {}\n\n{}",
                        interviews.len(),
                        lines.join("\n\n")
                    )
                }
                None => fallback(payload),
            }
        }
        ToolName::GetDashboardStats => format!(
            "**Dashboard Summary:**\n\
             • **Total Candidates:** {}\n\
             • **Total Jobs:** {}\n\
             • **Active Jobs:** {}\n\
             • **Pending Applications:** {}\n\
             • **Upcoming Interviews:** {}",
            count(payload, "total_candidates"),
            count(payload, "total_jobs"),
            count(payload, "active_jobs"),
            count(payload, "pending_applications"),
            count(payload, "upcoming_interviews"),
        ),
        ToolName::AddNote => {
            let target = payload
                .pointer("/note/entity_type")
                .and_then(Value::as_str)
                .unwrap_or("record");
            format!("Note added successfully to {target}.")
        }
        ToolName::CreateCandidate => format!(
            "Candidate \"{}\" created successfully.",
            payload
                .pointer("/candidate/full_name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
        ),
        ToolName::UpdateCandidate => "Candidate updated successfully.".to_string(),
        ToolName::CreateJob => format!(
            "Job \"{}\" created successfully.",
            payload
                .pointer("/job/title")
                .and_then(Value::as_str)
                .unwrap_or("Untitled")
        ),
        ToolName::UpdateJob => "Job updated successfully.".to_string(),
        ToolName::UpdateApplicationStage => format!(
            "Application moved to stage \"{}\".",
            payload
                .pointer("/application/stage")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
        ),
        ToolName::ScheduleInterview => format!(
            "Interview scheduled for {}.",
            payload
                .pointer("/interview/scheduled_at")
                .and_then(Value::as_str)
                .unwrap_or("the requested time")
        ),
        ToolName::GetCandidate | ToolName::GetJob | ToolName::GetClient => fallback(payload),
    }
}

/// Error rendering, distinct from the empty-result sentences above.
pub fn format_error(tool: ToolName, message: &str) -> String {
    format!("Error running {tool}: {message}")
}

/// Human-readable description of a mutating invocation, shown to the caller
/// before they confirm it.
pub fn describe_action(tool: ToolName, args: &Map<String, Value>) -> String {
    let arg = |name: &str| args.get(name).and_then(Value::as_str).unwrap_or("?");
    match tool {
        ToolName::AddNote => format!("Add note to {} {}", arg("entity_type"), arg("entity_id")),
        ToolName::CreateCandidate => format!("Create candidate \"{}\"", arg("full_name")),
        ToolName::UpdateCandidate => format!("Update candidate {}", arg("candidate_id")),
        ToolName::CreateJob => format!("Create job \"{}\"", arg("title")),
        ToolName::UpdateJob => format!("Update job {}", arg("job_id")),
        ToolName::UpdateApplicationStage => format!(
            "Move application {} to stage \"{}\"",
            arg("application_id"),
            arg("stage")
        ),
        ToolName::ScheduleInterview => format!(
            "Schedule interview for application {} at {}",
            arg("application_id"),
            arg("scheduled_at")
        ),
        // Read tools never become pending actions.
        _ => format!("Run {tool}"),
    }
}

fn fallback(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_list_renders_titles_statuses_locations() {
        let payload = json!({
            "count": 2,
            "jobs": [
                { "title": "Staff Engineer", "status": "active", "location": "Remote", "seniority": "Senior" },
                { "title": "Archivist", "status": "closed", "location": "Oslo" },
            ]
        });
        let text = format_result(ToolName::SearchJobs, &payload);
        assert!(text.starts_with("Found **2** job(s):"));
        assert!(text.contains("**Staff Engineer**"));
        assert!(text.contains("Status: active"));
        assert!(text.contains("Location: Remote | Senior"));
        assert!(text.contains("Location: Oslo"));
    }

    #[test]
    fn empty_results_are_sentences_not_blank_lists() {
        let empty = |key: &str| json!({ "count": 0, key: [] });
        assert_eq!(
            format_result(ToolName::SearchJobs, &empty("jobs")),
            "No jobs found matching your criteria."
        );
        assert_eq!(
            format_result(ToolName::SearchCandidates, &empty("candidates")),
            "No candidates found matching your criteria."
        );
        assert_eq!(
            format_result(ToolName::SearchClients, &empty("clients")),
            "No clients found."
        );
        assert_eq!(
            format_result(ToolName::SearchApplications, &empty("applications")),
            "No applications found."
        );
        assert_eq!(
            format_result(ToolName::GetUpcomingInterviews, &json!({ "interviews": [] })),
            "No upcoming interviews scheduled."
        );
    }

    #[test]
    fn empty_is_distinct_from_error() {
        let empty = format_result(ToolName::SearchJobs, &json!({ "count": 0, "jobs": [] }));
        let error = format_result(ToolName::SearchJobs, &json!({ "error": "connection reset" }));
        assert_ne!(empty, error);
        assert!(error.contains("connection reset"));
        assert!(error.starts_with("Error running search_jobs"));
    }

    #[test]
    fn dashboard_zeros_are_rendered_explicitly() {
        let text = format_result(ToolName::GetDashboardStats, &json!({}));
        assert!(text.contains("**Total Candidates:** 0"));
        assert!(text.contains("**Total Jobs:** 0"));
        assert!(text.contains("**Active Jobs:** 0"));
        assert!(text.contains("**Pending Applications:** 0"));
        assert!(text.contains("**Upcoming Interviews:** 0"));
        assert!(!text.contains("undefined"));
    }

    #[test]
    fn unknown_payload_shape_falls_back_to_json() {
        let text = format_result(ToolName::GetCandidate, &json!({ "full_name": "Ada" }));
        assert!(text.contains("\"full_name\""));
    }

    #[test]
    fn action_descriptions_name_the_target() {
        let mut args = Map::new();
        args.insert("entity_type".into(), "candidate".into());
        args.insert("entity_id".into(), "c-42".into());
        args.insert("content".into(), "great culture fit".into());
        assert_eq!(
            describe_action(ToolName::AddNote, &args),
            "Add note to candidate c-42"
        );

        let mut args = Map::new();
        args.insert("full_name".into(), "Ada Lovelace".into());
        assert_eq!(
            describe_action(ToolName::CreateCandidate, &args),
            "Create candidate \"Ada Lovelace\""
        );
    }
}
