// src/projects/fallback.rs
//! Bundled project list served when the remote API has nothing to offer

use std::sync::OnceLock;
use tracing::error;

use super::models::Project;

const FALLBACK_PROJECTS_JSON: &str = include_str!("../../data/fallback_projects.json");

/// The bundled dataset. Stale and read-only.
pub fn fallback_projects() -> Vec<Project> {
    static FALLBACK: OnceLock<Vec<Project>> = OnceLock::new();
    FALLBACK
        .get_or_init(|| {
            serde_json::from_str(FALLBACK_PROJECTS_JSON).unwrap_or_else(|e| {
                error!(error = %e, "Bundled fallback projects are not valid JSON");
                Vec::new()
            })
        })
        .clone()
}
