// src/projects/form.rs
//! Create/update workflow behind the admin project form
//!
//! Order matters: the form is validated before anything is uploaded, and the
//! record is only written once every file in the batch has a public URL.

use thiserror::Error;
use tracing::{info, warn};

use super::client::{ProjectBody, ProjectRepository};
use super::models::{Project, ProjectInput, ProjectStatus};
use super::slug::resolve_slug;
use super::validators::ProjectValidator;
use crate::common::{ValidationResult, Validator};
use crate::services::remote::ClientError;
use crate::services::uploader::{AssetUploader, LocalFile, UploadError};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Project form is invalid")]
    Invalid(ValidationResult),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Raw admin form fields, as typed by the user
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub title: String,
    pub slug: Option<String>,
    pub short_description: String,
    pub brief_description: String,
    pub description: String,
    /// Comma separated
    pub technologies: String,
    pub status: String,
    pub featured: bool,
    pub overview: String,
    pub methods: String,
    pub impact: String,
    pub gallery_captions: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub existing_images: Vec<String>,
    pub new_files: Vec<LocalFile>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ProjectForm {
    /// Technologies as a set: trimmed, empty entries dropped, first spelling
    /// of a case-insensitive duplicate kept
    pub fn technology_set(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for tech in self.technologies.split(',').map(str::trim) {
            if !tech.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(tech)) {
                seen.push(tech.to_string());
            }
        }
        seen
    }

    /// Builds the request body; `uploaded` URLs follow the existing images
    pub fn to_input(&self, uploaded: Vec<String>) -> Result<ProjectInput, ValidationResult> {
        let mut problems = ValidationResult::new();

        let status = if self.status.trim().is_empty() {
            ProjectStatus::default()
        } else {
            self.status.parse::<ProjectStatus>().unwrap_or_else(|e| {
                problems.add_error("status", &e);
                ProjectStatus::default()
            })
        };

        let mut images = self.existing_images.clone();
        images.extend(uploaded);

        let input = ProjectInput {
            title: self.title.trim().to_string(),
            slug: resolve_slug(&self.title, self.slug.as_deref()),
            short_description: non_empty(&self.short_description),
            brief_description: non_empty(&self.brief_description),
            description: non_empty(&self.description),
            technologies: self.technology_set(),
            status,
            featured: self.featured,
            images,
            overview: non_empty(&self.overview),
            methods: non_empty(&self.methods),
            impact: non_empty(&self.impact),
            gallery_captions: self
                .gallery_captions
                .iter()
                .filter_map(|c| non_empty(c))
                .collect(),
            github_url: non_empty(&self.github_url),
            live_url: non_empty(&self.live_url),
        };

        let validation = ProjectValidator.validate(&input);
        for error in validation.errors {
            problems.add_error(&error.field, &error.message);
        }

        if problems.is_valid {
            Ok(input)
        } else {
            Err(problems)
        }
    }

    /// Validates before uploading so a bad form never leaves orphaned blobs
    async fn prepare(self, uploader: &AssetUploader) -> Result<ProjectInput, FormError> {
        self.to_input(Vec::new()).map_err(FormError::Invalid)?;

        let uploaded = uploader.upload_many(&self.new_files).await?;
        let input = self.to_input(uploaded).map_err(FormError::Invalid)?;
        Ok(input)
    }

    /// Request body for the API. With no image host configured, new files
    /// are forwarded to the API as multipart `images` parts instead.
    pub async fn into_body(self, uploader: &AssetUploader) -> Result<ProjectBody, FormError> {
        if uploader.is_configured() || self.new_files.is_empty() {
            return Ok(ProjectBody::Json(self.prepare(uploader).await?));
        }

        let input = self.to_input(Vec::new()).map_err(FormError::Invalid)?;
        if let Some(file) = self.new_files.iter().find(|f| f.image_mime().is_none()) {
            return Err(UploadError::UnsupportedType {
                file_name: file.file_name.clone(),
            }
            .into());
        }

        info!(
            files = self.new_files.len(),
            "Image host not configured, forwarding files to the API"
        );
        Ok(ProjectBody::Multipart {
            input,
            files: self.new_files,
        })
    }
}

pub async fn submit_create(
    uploader: &AssetUploader,
    repo: &ProjectRepository,
    form: ProjectForm,
    token: &str,
) -> Result<Project, FormError> {
    let body = form.into_body(uploader).await?;
    let images = body.input().images.clone();

    repo.create(body, token).await.map_err(|e| {
        if !images.is_empty() {
            warn!(
                error = %e,
                images = ?images,
                "Project creation failed after images were uploaded"
            );
        }
        FormError::Client(e)
    })
}

pub async fn submit_update(
    uploader: &AssetUploader,
    repo: &ProjectRepository,
    id: &str,
    form: ProjectForm,
    token: &str,
) -> Result<Project, FormError> {
    let body = form.into_body(uploader).await?;
    Ok(repo.update(id, body, token).await?)
}

// ============================================================================
// Optimistic list updates
// ============================================================================

/// Snapshot taken before an optimistic change
#[allow(dead_code)]
#[derive(Debug)]
pub struct Rollback {
    snapshot: Vec<Project>,
}

/// Locally held project list that reflects changes before the backend confirms
#[allow(dead_code)]
#[derive(Debug, Default, Clone)]
pub struct ProjectList {
    projects: Vec<Project>,
}

#[allow(dead_code)]
impl ProjectList {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn checkpoint(&self) -> Rollback {
        Rollback {
            snapshot: self.projects.clone(),
        }
    }

    pub fn rollback(&mut self, rollback: Rollback) {
        self.projects = rollback.snapshot;
    }

    pub fn insert(&mut self, project: Project) -> Rollback {
        let rollback = self.checkpoint();
        self.projects.insert(0, project);
        rollback
    }

    /// Replaces the entry with the same slug, or the same external id
    pub fn replace(&mut self, project: Project) -> Rollback {
        let rollback = self.checkpoint();
        let position = self.projects.iter().position(|p| {
            p.slug == project.slug
                || (p.external_id().is_some() && p.external_id() == project.external_id())
        });
        match position {
            Some(index) => self.projects[index] = project,
            None => self.projects.insert(0, project),
        }
        rollback
    }

    pub fn remove(&mut self, project: &Project) -> Rollback {
        let rollback = self.checkpoint();
        self.projects.retain(|p| p != project);
        rollback
    }

    /// Shows the project immediately, then swaps in the server's record or
    /// rolls back if the create fails
    pub async fn create(
        &mut self,
        repo: &ProjectRepository,
        input: ProjectInput,
        token: &str,
    ) -> Result<Project, ClientError> {
        let rollback = self.insert(input.to_placeholder());

        match repo.create(ProjectBody::Json(input), token).await {
            Ok(created) => {
                self.replace(created.clone());
                Ok(created)
            }
            Err(e) => {
                self.rollback(rollback);
                Err(e)
            }
        }
    }

    pub async fn delete(
        &mut self,
        repo: &ProjectRepository,
        project: &Project,
        token: &str,
    ) -> Result<(), ClientError> {
        let rollback = self.remove(project);

        if let Err(e) = repo.delete(project, token).await {
            info!(title = %project.title, "Restoring project after failed delete");
            self.rollback(rollback);
            return Err(e);
        }
        Ok(())
    }
}
