// src/projects/client.rs
//! Client for the remote `/api/projects` resource

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use tracing::{debug, info, warn};

use super::fallback::fallback_projects;
use super::models::{Project, ProjectInput};
use crate::services::remote::{decode_enveloped, ClientError, RemoteApi};
use crate::services::uploader::LocalFile;

/// Create/update payload: plain JSON, or multipart with the project as a
/// `data` JSON field plus raw `images` parts
pub enum ProjectBody {
    Json(ProjectInput),
    Multipart {
        input: ProjectInput,
        files: Vec<LocalFile>,
    },
}

impl ProjectBody {
    pub fn input(&self) -> &ProjectInput {
        match self {
            ProjectBody::Json(input) | ProjectBody::Multipart { input, .. } => input,
        }
    }

    fn into_form(input: ProjectInput, files: Vec<LocalFile>) -> Result<Form, ClientError> {
        let data = serde_json::to_string(&input).map_err(|e| ClientError::Decode(e.to_string()))?;
        let mut form = Form::new().text("data", data);

        for file in files {
            let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part("images", part);
        }

        Ok(form)
    }
}

pub struct ProjectRepository {
    api: RemoteApi,
}

impl ProjectRepository {
    pub fn new(http: Client, api_base_url: &str) -> Self {
        Self {
            api: RemoteApi::new(http, api_base_url),
        }
    }

    // ============================================================================
    // Reads
    // ============================================================================

    /// Lists projects. An unreachable backend, an error status or an empty
    /// list all yield the bundled dataset instead.
    pub async fn list(&self) -> Vec<Project> {
        let request = self.api.request(Method::GET, "/api/projects", None);

        let remote = match self.api.send_json(request).await {
            Ok(value) => decode_enveloped::<Vec<Project>>(value, "projects"),
            Err(e) => Err(e),
        };

        match remote {
            Ok(projects) if !projects.is_empty() => {
                debug!(count = projects.len(), "Loaded projects from remote API");
                projects
            }
            Ok(_) => {
                info!("Remote project list is empty, serving bundled projects");
                fallback_projects()
            }
            Err(e) => {
                warn!(error = %e, "Remote project list unavailable, serving bundled projects");
                fallback_projects()
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Project, ClientError> {
        let path = format!("/api/projects/{}", urlencoding::encode(id));
        let value = self
            .api
            .send_json(self.api.request(Method::GET, &path, None))
            .await?;
        decode_enveloped(value, "project")
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Project, ClientError> {
        let path = format!("/api/projects/slug/{}", urlencoding::encode(slug));
        let value = self
            .api
            .send_json(self.api.request(Method::GET, &path, None))
            .await?;
        decode_enveloped(value, "project")
    }

    // ============================================================================
    // Writes
    // ============================================================================

    pub async fn create(&self, body: ProjectBody, token: &str) -> Result<Project, ClientError> {
        let title = body.input().title.clone();
        let request = self.with_body(
            self.api.request(Method::POST, "/api/projects", Some(token)),
            body,
        )?;

        let project: Project = decode_enveloped(self.api.send_json(request).await?, "project")?;
        info!(title = %title, id = ?project.id, slug = %project.slug, "Project created");
        Ok(project)
    }

    pub async fn update(
        &self,
        id: &str,
        body: ProjectBody,
        token: &str,
    ) -> Result<Project, ClientError> {
        let path = format!("/api/projects/{}", urlencoding::encode(id));
        let request = self.with_body(self.api.request(Method::PUT, &path, Some(token)), body)?;

        let project: Project = decode_enveloped(self.api.send_json(request).await?, "project")?;
        info!(id = %id, slug = %project.slug, "Project updated");
        Ok(project)
    }

    /// Deletes a project by its external id. A record without one is refused
    /// before any request is made.
    pub async fn delete(&self, project: &Project, token: &str) -> Result<(), ClientError> {
        let Some(id) = project.external_id() else {
            warn!(
                title = %project.title,
                storage_id = ?project.storage_id,
                "Refusing to delete project without an external id"
            );
            return Err(ClientError::MissingExternalId {
                title: project.title.clone(),
            });
        };

        self.delete_by_id(id, token).await
    }

    pub async fn delete_by_id(&self, id: &str, token: &str) -> Result<(), ClientError> {
        let path = format!("/api/projects/{}", urlencoding::encode(id));
        self.api
            .send(self.api.request(Method::DELETE, &path, Some(token)))
            .await?;

        info!(id = %id, "Project deleted");
        Ok(())
    }

    fn with_body(
        &self,
        request: reqwest::RequestBuilder,
        body: ProjectBody,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(match body {
            ProjectBody::Json(input) => request.json(&input),
            ProjectBody::Multipart { input, files } => {
                request.multipart(ProjectBody::into_form(input, files)?)
            }
        })
    }
}
