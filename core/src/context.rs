//! Situational context derived from the caller's navigation location.
//!
//! Recomputed on every request from the path plus the authenticated caller;
//! never persisted, no side effects.

use serde::{Deserialize, Serialize};

use crate::catalog::Role;
use copilot_tools::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub current_page: String,
    pub current_path: String,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<String>,
    pub organization_id: String,
    pub caller_id: String,
    pub caller_role: Role,
}

impl Context {
    /// Parses the leading path segments: a known entity collection followed by
    /// an id yields an (entity type, id) pair, with "applications" mapping to
    /// the singular "application". Anything else only sets the page name.
    pub fn resolve(path: &str, organization_id: &str, caller_id: &str, role: Role) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (entity_type, entity_id) = match segments.as_slice() {
            [collection, id, ..] => match EntityKind::from_collection(collection) {
                Some(kind) => (Some(kind), Some((*id).to_string())),
                None => (None, None),
            },
            _ => (None, None),
        };

        Context {
            current_page: segments.first().unwrap_or(&"dashboard").to_string(),
            current_path: path.to_string(),
            entity_type,
            entity_id,
            organization_id: organization_id.to_string(),
            caller_id: caller_id.to_string(),
            caller_role: role,
        }
    }
}
