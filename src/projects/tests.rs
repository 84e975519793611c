//! Tests for projects module
//!
//! These tests verify core project functionality including:
//! - Remote list with bundled fallback
//! - External id handling on delete
//! - Form validation, uploads and the create workflow
//! - Optimistic list updates

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::config::UploadConfig;
    use crate::common::{ApiOutcome, Validator};
    use crate::services::remote::ClientError;
    use crate::services::uploader::{AssetUploader, LocalFile};
    use client::{ProjectBody, ProjectRepository};
    use fallback::fallback_projects;
    use form::{submit_create, FormError, ProjectForm, ProjectList};
    use mockito::Matcher;
    use models::{Project, ProjectInput, ProjectStatus};
    use serde_json::json;

    const TOKEN: &str = "header.payload.signature";

    fn repo(url: &str) -> ProjectRepository {
        ProjectRepository::new(reqwest::Client::new(), url)
    }

    fn uploader(url: &str) -> AssetUploader {
        AssetUploader::new(
            reqwest::Client::new(),
            Some(UploadConfig {
                api_base: url.to_string(),
                cloud_name: "demo".to_string(),
                upload_preset: "portfolio".to_string(),
            }),
        )
    }

    fn svg(name: &str) -> LocalFile {
        LocalFile::new(name, r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#)
    }

    fn project(id: Option<&str>, title: &str) -> Project {
        serde_json::from_value(json!({
            "id": id,
            "_id": "64f0c0ffee",
            "title": title,
            "slug": slug::slugify(title),
        }))
        .unwrap()
    }

    fn form(title: &str) -> ProjectForm {
        ProjectForm {
            title: title.to_string(),
            technologies: "R, Python, r, ,Stata".to_string(),
            status: "in progress".to_string(),
            ..ProjectForm::default()
        }
    }

    // ============================================================================
    // Model Tests
    // ============================================================================

    #[test]
    fn test_project_deserializes_both_ids() {
        let project: Project = serde_json::from_value(json!({
            "id": 17,
            "_id": "64f0c0ffee",
            "title": "Cohort Study",
            "slug": "cohort-study",
            "status": "in-progress",
            "githubUrl": "https://github.com/example/cohort",
        }))
        .unwrap();

        assert_eq!(project.external_id(), Some("17"));
        assert_eq!(project.storage_id.as_deref(), Some("64f0c0ffee"));
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(project.images.is_empty());

        let without_external: Project =
            serde_json::from_value(json!({ "_id": "abc", "title": "Orphan" })).unwrap();
        assert_eq!(without_external.external_id(), None);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("In Progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("in_progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("completed".parse::<ProjectStatus>(), Ok(ProjectStatus::Completed));
        assert!("abandoned".parse::<ProjectStatus>().is_err());
        assert_eq!(
            serde_json::to_value(ProjectStatus::InProgress).unwrap(),
            json!("in-progress")
        );
    }

    // ============================================================================
    // Repository Tests
    // ============================================================================

    #[tokio::test]
    async fn test_list_falls_back_on_empty_remote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/projects")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let projects = repo(&server.url()).list().await;

        assert!(!projects.is_empty());
        assert_eq!(projects, fallback_projects());
    }

    #[tokio::test]
    async fn test_list_falls_back_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/projects")
            .with_status(503)
            .create_async()
            .await;

        assert_eq!(repo(&server.url()).list().await, fallback_projects());
        assert_eq!(repo("http://127.0.0.1:1").list().await, fallback_projects());
    }

    #[tokio::test]
    async fn test_list_reads_enveloped_remote_projects() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/projects")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "projects": [{ "id": "p1", "title": "Remote", "slug": "remote" }] })
                    .to_string(),
            )
            .create_async()
            .await;

        let projects = repo(&server.url()).list().await;

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Remote");
    }

    #[tokio::test]
    async fn test_get_by_slug_and_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _found = server
            .mock("GET", "/api/projects/slug/tb-study")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "id": "p1", "title": "TB Study", "slug": "tb-study" } }).to_string())
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/api/projects/slug/nope")
            .with_status(404)
            .with_body(r#"{"message":"Project not found"}"#)
            .create_async()
            .await;

        let repo = repo(&server.url());

        let project = repo.get_by_slug("tb-study").await.unwrap();
        assert_eq!(project.external_id(), Some("p1"));

        match repo.get_by_slug("nope").await {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Project not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_without_external_id_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let orphan = project(None, "Orphaned Record");
        let result = repo(&server.url()).delete(&orphan, TOKEN).await;

        mock.assert_async().await;
        let outcome = ApiOutcome::from(result);
        assert!(!outcome.success);
        let error = outcome.error.unwrap();
        assert!(error.contains("Orphaned Record"));
        assert!(error.contains("no external id"));
    }

    #[tokio::test]
    async fn test_delete_uses_external_id_and_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/projects/ext-9")
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        repo(&server.url())
            .delete(&project(Some("ext-9"), "Has Id"), TOKEN)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_posts_json_with_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/projects")
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .match_body(Matcher::PartialJson(json!({ "title": "TB Study!!", "slug": "tb-study" })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "new-1", "title": "TB Study!!", "slug": "tb-study" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let input = form("TB Study!!").to_input(Vec::new()).unwrap();
        let created = repo(&server.url())
            .create(ProjectBody::Json(input), TOKEN)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.external_id(), Some("new-1"));
    }

    #[tokio::test]
    async fn test_update_accepts_multipart_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/projects/p1")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::Regex(r#"name="data""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "p1", "title": "Updated", "slug": "updated" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let input = form("Updated").to_input(Vec::new()).unwrap();
        let updated = repo(&server.url())
            .update(
                "p1",
                ProjectBody::Multipart {
                    input,
                    files: vec![svg("cover.svg")],
                },
                TOKEN,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(updated.slug, "updated");
    }

    // ============================================================================
    // Form Tests
    // ============================================================================

    #[test]
    fn test_form_builds_normalized_input() {
        let mut form = form("TB Study!!");
        form.existing_images = vec!["https://cdn.example.com/old.png".to_string()];
        form.github_url = "  ".to_string();

        let input = form
            .to_input(vec!["https://cdn.example.com/new.png".to_string()])
            .unwrap();

        assert_eq!(input.slug, "tb-study");
        assert_eq!(input.technologies, vec!["R", "Python", "Stata"]);
        assert_eq!(input.status, ProjectStatus::InProgress);
        assert_eq!(
            input.images,
            vec![
                "https://cdn.example.com/old.png",
                "https://cdn.example.com/new.png"
            ]
        );
        assert_eq!(input.github_url, None);
    }

    #[test]
    fn test_form_validation_errors() {
        let mut form = form("!!!");
        form.status = "abandoned".to_string();
        form.live_url = "ftp://example.com".to_string();

        let result = form.to_input(Vec::new()).unwrap_err();

        assert!(!result.is_valid);
        assert!(result.has_error("slug"));
        assert!(result.has_error("status"));
        assert!(result.has_error("liveUrl"));
    }

    #[test]
    fn test_project_validator_requires_title() {
        let mut input = form("Valid").to_input(Vec::new()).unwrap();
        input.title = "   ".to_string();

        let result = validators::ProjectValidator.validate(&input);
        assert!(result.has_error("title"));
    }

    #[tokio::test]
    async fn test_failed_upload_batch_creates_no_project() {
        let mut server = mockito::Server::new_async().await;

        let _first = server
            .mock("POST", "/v1_1/demo/image/upload")
            .match_body(Matcher::Regex(r#"filename="first\.svg""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://cdn.example.com/first.svg"}"#)
            .create_async()
            .await;
        let _second = server
            .mock("POST", "/v1_1/demo/image/upload")
            .match_body(Matcher::Regex(r#"filename="second\.svg""#.to_string()))
            .with_status(400)
            .with_body(r#"{"error":{"message":"Upload preset not found"}}"#)
            .create_async()
            .await;
        let _third = server
            .mock("POST", "/v1_1/demo/image/upload")
            .match_body(Matcher::Regex(r#"filename="third\.svg""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://cdn.example.com/third.svg"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/projects")
            .expect(0)
            .create_async()
            .await;

        let mut form = form("TB Study!!");
        form.new_files = vec![svg("first.svg"), svg("second.svg"), svg("third.svg")];

        let result = submit_create(
            &uploader(&server.url()),
            &repo(&server.url()),
            form,
            TOKEN,
        )
        .await;

        // first.svg may already sit on the host, but no record refers to it
        assert!(matches!(result, Err(FormError::Upload(_))));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_form_uploads_nothing() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/v1_1/demo/image/upload")
            .expect(0)
            .create_async()
            .await;

        let mut form = form("   ");
        form.new_files = vec![svg("cover.svg")];

        let result = submit_create(
            &uploader(&server.url()),
            &repo(&server.url()),
            form,
            TOKEN,
        )
        .await;

        assert!(matches!(result, Err(FormError::Invalid(_))));
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_create_attaches_uploaded_urls() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/v1_1/demo/image/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://cdn.example.com/cover.svg"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/projects")
            .match_body(Matcher::PartialJson(json!({
                "images": ["https://cdn.example.com/cover.svg"]
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "p2",
                    "title": "TB Study!!",
                    "slug": "tb-study",
                    "images": ["https://cdn.example.com/cover.svg"]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let mut form = form("TB Study!!");
        form.new_files = vec![svg("cover.svg")];

        let created = submit_create(
            &uploader(&server.url()),
            &repo(&server.url()),
            form,
            TOKEN,
        )
        .await
        .unwrap();

        create.assert_async().await;
        assert_eq!(created.images, vec!["https://cdn.example.com/cover.svg"]);
    }

    // ============================================================================
    // Optimistic List Tests
    // ============================================================================

    fn input(title: &str) -> ProjectInput {
        form(title).to_input(Vec::new()).unwrap()
    }

    #[tokio::test]
    async fn test_optimistic_create_swaps_in_server_record() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/api/projects")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "srv-1", "title": "New Study", "slug": "new-study" }).to_string())
            .create_async()
            .await;

        let mut list = ProjectList::new(vec![project(Some("a"), "Existing")]);
        list.create(&repo(&server.url()), input("New Study"), TOKEN)
            .await
            .unwrap();

        assert_eq!(list.projects().len(), 2);
        assert_eq!(list.projects()[0].external_id(), Some("srv-1"));
    }

    #[tokio::test]
    async fn test_optimistic_create_rolls_back_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/api/projects")
            .with_status(409)
            .with_body(r#"{"message":"slug already exists"}"#)
            .create_async()
            .await;

        let existing = vec![project(Some("a"), "Existing")];
        let mut list = ProjectList::new(existing.clone());

        let result = list
            .create(&repo(&server.url()), input("Existing"), TOKEN)
            .await;

        assert!(matches!(result, Err(ClientError::Status { status: 409, .. })));
        assert_eq!(list.projects(), existing.as_slice());
    }

    #[tokio::test]
    async fn test_optimistic_delete_restores_record_without_external_id() {
        let orphan = project(None, "Orphan");
        let kept = project(Some("k"), "Kept");
        let mut list = ProjectList::new(vec![kept.clone(), orphan.clone()]);

        let result = list.delete(&repo("http://127.0.0.1:1"), &orphan, TOKEN).await;

        assert!(matches!(result, Err(ClientError::MissingExternalId { .. })));
        assert_eq!(list.projects(), &[kept, orphan]);
    }

    #[test]
    fn test_replace_matches_by_slug_or_external_id() {
        let mut list = ProjectList::new(vec![project(Some("a"), "Alpha"), project(Some("b"), "Beta")]);

        let mut renamed = project(Some("b"), "Beta Renamed");
        renamed.featured = true;
        list.replace(renamed.clone());

        assert_eq!(list.projects().len(), 2);
        assert_eq!(list.projects()[1], renamed);

        let rollback = list.remove(&renamed);
        assert_eq!(list.projects().len(), 1);
        list.rollback(rollback);
        assert_eq!(list.projects().len(), 2);
    }

    // ============================================================================
    // Admin Route Tests
    // ============================================================================

    fn admin_cookie() -> String {
        let claims = json!({
            "sub": "admin",
            "email": "owner@example.com",
            "role": "admin",
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"route-tests"),
        )
        .unwrap();
        format!("authToken={}", token)
    }

    fn admin_app(api_base_url: &str) -> axum::Router {
        let mut config = crate::common::AppConfig::from_env();
        config.api_base_url = api_base_url.to_string();
        config.token_verify_secret = None;
        config.upload = None;
        let state = crate::common::AppState::new(
            config,
            reqwest::Client::new(),
            crate::services::ContactMailer::disabled(),
        );
        projects_routes().layer(axum::Extension(std::sync::Arc::new(state)))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_delete_route_refuses_record_without_external_id() {
        use tower::ServiceExt;

        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/api/projects/64f0c0ffee")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "_id": "64f0c0ffee", "title": "Orphaned Record", "slug": "orphaned-record" })
                    .to_string(),
            )
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/admin/projects/64f0c0ffee")
            .header("cookie", admin_cookie())
            .body(axum::body::Body::empty())
            .unwrap();
        let response = admin_app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("no external id"));
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_route_uses_external_id() {
        use tower::ServiceExt;

        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/api/projects/ext-9")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "ext-9", "_id": "64f0c0ffee", "title": "Has Id", "slug": "has-id" }).to_string())
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/projects/ext-9")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/admin/projects/ext-9")
            .header("cookie", admin_cookie())
            .body(axum::body::Body::empty())
            .unwrap();
        let response = admin_app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(json_body(response).await["success"], true);
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_route_forwards_large_image_without_image_host() {
        use tower::ServiceExt;

        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/api/projects")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "p3", "title": "Cohort Maps", "slug": "cohort-maps" }).to_string())
            .expect(1)
            .create_async()
            .await;

        // A 3 MiB PNG: over axum's default body limit
        let mut png = vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52,
        ];
        png.resize(3 * 1024 * 1024, 0);

        let boundary = "portfolio-boundary";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nCohort Maps\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"map.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            b = boundary
        )
        .into_bytes();
        body.extend_from_slice(&png);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/admin/projects")
            .header("cookie", admin_cookie())
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(axum::body::Body::from(body))
            .unwrap();
        let response = admin_app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["slug"], "cohort-maps");
        create.assert_async().await;
    }
}
