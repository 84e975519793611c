// src/projects/handlers.rs

use axum::extract::{Extension, Json, Multipart, Path};
use std::sync::Arc;
use tracing::{info, warn};

use super::form::{submit_create, submit_update, ProjectForm};
use super::models::Project;
use crate::auth::AdminSession;
use crate::common::{ApiError, ApiOutcome, AppState};
use crate::services::uploader::LocalFile;

// ============================================================================
// Public handlers
// ============================================================================

/// GET /projects - project list, falling back to the bundled dataset
pub async fn list_projects(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ApiOutcome<Vec<Project>>> {
    Json(ApiOutcome::ok(state.projects.list().await))
}

/// GET /projects/:slug
pub async fn project_by_slug(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiOutcome<Project>>, ApiError> {
    let project = state.projects.get_by_slug(&slug).await?;
    Ok(Json(ApiOutcome::ok(project)))
}

// ============================================================================
// Admin handlers
// ============================================================================

/// GET /admin - dashboard summary
pub async fn admin_dashboard(
    Extension(state): Extension<Arc<AppState>>,
    admin: AdminSession,
) -> Json<ApiOutcome<serde_json::Value>> {
    let projects = state.projects.list().await;
    let featured = projects.iter().filter(|p| p.featured).count();

    Json(ApiOutcome::ok(serde_json::json!({
        "session": admin.session,
        "projectCount": projects.len(),
        "featuredCount": featured,
    })))
}

/// GET /admin/projects
pub async fn admin_list_projects(
    Extension(state): Extension<Arc<AppState>>,
    _admin: AdminSession,
) -> Json<ApiOutcome<Vec<Project>>> {
    Json(ApiOutcome::ok(state.projects.list().await))
}

/// GET /admin/projects/:id
pub async fn admin_get_project(
    Extension(state): Extension<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<ApiOutcome<Project>>, ApiError> {
    let project = state.projects.get_by_id(&id).await?;
    Ok(Json(ApiOutcome::ok(project)))
}

/// POST /admin/projects - multipart project form with optional image files
pub async fn admin_create_project(
    Extension(state): Extension<Arc<AppState>>,
    admin: AdminSession,
    multipart: Multipart,
) -> Result<Json<ApiOutcome<Project>>, ApiError> {
    let form = read_project_form(multipart).await?;

    info!(
        user_id = %admin.session.user_id,
        title = %form.title,
        files = form.new_files.len(),
        "Project create submitted"
    );

    let project =
        submit_create(&state.uploader, &state.projects, form, &admin.token).await?;
    Ok(Json(ApiOutcome::ok(project)))
}

/// PUT /admin/projects/:id - multipart project form with optional image files
pub async fn admin_update_project(
    Extension(state): Extension<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiOutcome<Project>>, ApiError> {
    let form = read_project_form(multipart).await?;

    info!(
        user_id = %admin.session.user_id,
        id = %id,
        files = form.new_files.len(),
        "Project update submitted"
    );

    let project =
        submit_update(&state.uploader, &state.projects, &id, form, &admin.token).await?;
    Ok(Json(ApiOutcome::ok(project)))
}

/// DELETE /admin/projects/:id
///
/// The record is looked up first; one the backend has not given an external
/// id is refused before any delete request goes out.
pub async fn admin_delete_project(
    Extension(state): Extension<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<ApiOutcome<()>>, ApiError> {
    info!(user_id = %admin.session.user_id, id = %id, "Project delete requested");

    let project = state.projects.get_by_id(&id).await?;
    state.projects.delete(&project, &admin.token).await?;
    Ok(Json(ApiOutcome::ok(())))
}

// ============================================================================
// Multipart parsing
// ============================================================================

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// List fields arrive either as a JSON array or one value per field
fn push_values(target: &mut Vec<String>, value: &str) {
    match serde_json::from_str::<Vec<String>>(value) {
        Ok(urls) => target.extend(urls),
        Err(_) if !value.trim().is_empty() => target.push(value.trim().to_string()),
        Err(_) => {}
    }
}

pub async fn read_project_form(mut multipart: Multipart) -> Result<ProjectForm, ApiError> {
    let mut form = ProjectForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" || name == "files" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;

            if bytes.is_empty() {
                continue;
            }

            let mut file = LocalFile::new(file_name, bytes);
            file.content_type = content_type;
            form.new_files.push(file);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|_| ApiError::BadRequest(format!("Invalid value for {}", name)))?;

        match name.as_str() {
            "title" => form.title = value,
            "slug" => form.slug = Some(value),
            "shortDescription" => form.short_description = value,
            "briefDescription" => form.brief_description = value,
            "description" => form.description = value,
            "technologies" => form.technologies = value,
            "status" => form.status = value,
            "featured" => form.featured = parse_flag(&value),
            "overview" => form.overview = value,
            "methods" => form.methods = value,
            "impact" => form.impact = value,
            "galleryCaptions" => push_values(&mut form.gallery_captions, &value),
            "githubUrl" => form.github_url = value,
            "liveUrl" => form.live_url = value,
            "existingImages" => push_values(&mut form.existing_images, &value),
            other => warn!(field = %other, "Ignoring unknown project form field"),
        }
    }

    Ok(form)
}
